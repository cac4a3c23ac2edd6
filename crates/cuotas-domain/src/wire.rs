//! Backend payload shapes and their validated conversion into domain types.
//!
//! External responses are deserialized into these records first and then
//! converted with `TryFrom`, so unexpected shapes are rejected at the boundary
//! instead of leaking into the ledger code.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    member::{DebtSummary, Member},
    month::MonthKey,
    payment::Payment,
};

/// Amounts arrive as JSON strings or numbers depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireAmount {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl WireAmount {
    fn into_text(self) -> String {
        match self {
            WireAmount::Text(value) => value.trim().to_string(),
            WireAmount::Integer(value) => value.to_string(),
            WireAmount::Float(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPayment {
    pub id: i64,
    pub id_persona: i64,
    pub mes_anio_tmp: String,
    pub monto: WireAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMember {
    pub id_asociado: i64,
    pub nombre_apellidos: String,
    pub fecha_alta_tmp: String,
    #[serde(default)]
    pub fecha_baja_tmp: Option<String>,
    #[serde(rename = "todosPagados", default)]
    pub todos_pagados: Option<bool>,
    #[serde(rename = "cantidadMesesMorosos", default)]
    pub cantidad_meses_morosos: Option<u32>,
    #[serde(rename = "mesesMorosos", default)]
    pub meses_morosos: Vec<String>,
    #[serde(rename = "totalMeses", default)]
    pub total_meses: Option<u32>,
    #[serde(rename = "pagosRealizados", default)]
    pub pagos_realizados: Option<u32>,
    #[serde(default)]
    pub pagos: Vec<ApiPayment>,
}

/// Reasons a backend record is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    InvalidId(i64),
    EmptyName,
    EmptyDate(&'static str),
    InvalidAmount(String),
    InvalidMonth(String),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::InvalidId(id) => write!(f, "identifier {} must be positive", id),
            WireError::EmptyName => f.write_str("member name is empty"),
            WireError::EmptyDate(field) => write!(f, "field `{}` is empty", field),
            WireError::InvalidAmount(raw) => write!(f, "`{}` is not a decimal amount", raw),
            WireError::InvalidMonth(raw) => write!(f, "`{}` is not a YYYY-MM month", raw),
        }
    }
}

impl std::error::Error for WireError {}

impl TryFrom<ApiPayment> for Payment {
    type Error = WireError;

    fn try_from(record: ApiPayment) -> Result<Self, Self::Error> {
        if record.id <= 0 {
            return Err(WireError::InvalidId(record.id));
        }
        if record.id_persona <= 0 {
            return Err(WireError::InvalidId(record.id_persona));
        }
        if record.mes_anio_tmp.trim().is_empty() {
            return Err(WireError::EmptyDate("mes_anio_tmp"));
        }
        let amount = record.monto.into_text();
        if Decimal::from_str(&amount).is_err() {
            return Err(WireError::InvalidAmount(amount));
        }
        Ok(Payment {
            id: record.id,
            owner_id: record.id_persona,
            timestamp: record.mes_anio_tmp.trim().to_string(),
            amount,
        })
    }
}

/// A member together with the payments embedded in the same response.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub member: Member,
    pub payments: Vec<Payment>,
}

impl TryFrom<ApiMember> for MemberRecord {
    type Error = WireError;

    fn try_from(record: ApiMember) -> Result<Self, Self::Error> {
        if record.id_asociado <= 0 {
            return Err(WireError::InvalidId(record.id_asociado));
        }
        let full_name = record.nombre_apellidos.trim().to_string();
        if full_name.is_empty() {
            return Err(WireError::EmptyName);
        }
        let start_date = record.fecha_alta_tmp.trim().to_string();
        if start_date.is_empty() {
            return Err(WireError::EmptyDate("fecha_alta_tmp"));
        }
        let end_date = record
            .fecha_baja_tmp
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let summary = match (record.todos_pagados, record.cantidad_meses_morosos) {
            (None, None) => None,
            (all_paid, overdue) => {
                let overdue_months = record
                    .meses_morosos
                    .iter()
                    .map(|raw| {
                        MonthKey::from_str(raw.trim())
                            .map_err(|_| WireError::InvalidMonth(raw.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Some(DebtSummary {
                    all_paid: all_paid.unwrap_or(false),
                    overdue_month_count: overdue.unwrap_or(overdue_months.len() as u32),
                    overdue_months,
                    total_months: record.total_meses.unwrap_or(0),
                    payments_made: record.pagos_realizados.unwrap_or(0),
                })
            }
        };

        let payments = record
            .pagos
            .into_iter()
            .map(Payment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MemberRecord {
            member: Member {
                id: record.id_asociado,
                full_name,
                start_date,
                end_date,
                summary,
            },
            payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMBER_JSON: &str = r#"{
        "id_asociado": 4,
        "nombre_apellidos": "  María López ",
        "fecha_alta_tmp": "2021-06-05T00:00:00.000Z",
        "fecha_baja_tmp": null,
        "todosPagados": false,
        "cantidadMesesMorosos": 2,
        "mesesMorosos": ["2024-01", "2024-02"],
        "totalMeses": 30,
        "pagosRealizados": 28,
        "pagos": [
            {"id": 10, "id_persona": 4, "mes_anio_tmp": "2023-12-01T00:00:00.000Z", "monto": "15.00"},
            {"id": 11, "id_persona": 4, "mes_anio_tmp": "2023-11", "monto": 15}
        ]
    }"#;

    #[test]
    fn converts_backend_member_with_payments() {
        let raw: ApiMember = serde_json::from_str(MEMBER_JSON).unwrap();
        let record = MemberRecord::try_from(raw).unwrap();
        assert_eq!(record.member.full_name, "María López");
        assert!(record.member.is_active());
        let summary = record.member.summary.expect("summary present");
        assert_eq!(summary.overdue_month_count, 2);
        assert_eq!(summary.overdue_months[1].to_string(), "2024-02");
        assert_eq!(record.payments.len(), 2);
        assert_eq!(record.payments[1].amount, "15");
    }

    #[test]
    fn member_without_aggregates_has_no_summary() {
        let raw: ApiMember = serde_json::from_str(
            r#"{"id_asociado": 1, "nombre_apellidos": "Juan", "fecha_alta_tmp": "2022-01-10"}"#,
        )
        .unwrap();
        let record = MemberRecord::try_from(raw).unwrap();
        assert!(record.member.summary.is_none());
        assert!(record.payments.is_empty());
    }

    #[test]
    fn rejects_non_decimal_amounts_and_blank_names() {
        let payment = ApiPayment {
            id: 1,
            id_persona: 1,
            mes_anio_tmp: "2024-01".into(),
            monto: WireAmount::Text("quince".into()),
        };
        assert_eq!(
            Payment::try_from(payment),
            Err(WireError::InvalidAmount("quince".into()))
        );

        let raw: ApiMember = serde_json::from_str(
            r#"{"id_asociado": 1, "nombre_apellidos": "  ", "fecha_alta_tmp": "2022-01-10"}"#,
        )
        .unwrap();
        assert_eq!(MemberRecord::try_from(raw), Err(WireError::EmptyName));
    }
}
