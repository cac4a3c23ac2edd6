//! C ABI for the mobile client.
//!
//! Every fallible entry point returns an [`FfiErrorCategory`] code and, on
//! failure, writes a heap message to `out_error`. Strings handed out by this
//! module must be released with [`cuotas_string_free`].

use std::{
    ffi::{CStr, CString},
    os::raw::{c_char, c_int},
    ptr,
    sync::OnceLock,
};

use serde::Deserialize;

use cuotas_core::{
    api_classify_summary, api_member_status, api_parse_payments_to_ledger, CoreError,
    OffsetClock,
};
use cuotas_domain::{ApiMember, ApiPayment, DebtSource, DebtStatus, DebtSummary, MemberRecord, Payment};

/// Semantic version of the Rust core (mirrors `Cargo.toml`).
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Semantic version of the FFI surface. Bumps when ABI/contract changes.
pub const FFI_VERSION: &str = "0.1.0";

/// Status codes written by [`cuotas_classify_summary_json`].
pub const STATUS_CURRENT: c_int = 0;
pub const STATUS_DEBT: c_int = 1;

/// Error categories surfaced across the FFI boundary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCategory {
    Ok = 0,
    Validation = 1,
    Persistence = 2,
    Internal = 3,
}

impl From<FfiErrorCategory> for i32 {
    fn from(value: FfiErrorCategory) -> Self {
        value as i32
    }
}

/// Maps core failures onto the categories callers switch on.
pub fn classify_error(err: &CoreError) -> FfiErrorCategory {
    match err {
        CoreError::Validation(_)
        | CoreError::MemberNotFound(_)
        | CoreError::PaymentNotFound(_)
        | CoreError::DuplicatePayment { .. }
        | CoreError::PermissionDenied { .. } => FfiErrorCategory::Validation,
        CoreError::Storage(_) | CoreError::Io(_) => FfiErrorCategory::Persistence,
        CoreError::Serde(_) => FfiErrorCategory::Internal,
    }
}

/// Returns the core (Rust) semantic version as a C string.
#[no_mangle]
pub extern "C" fn cuotas_core_version() -> *const c_char {
    static CORE: OnceLock<CString> = OnceLock::new();
    CORE.get_or_init(|| CString::new(CORE_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Returns the FFI interface semantic version as a C string.
#[no_mangle]
pub extern "C" fn cuotas_ffi_version() -> *const c_char {
    static FFI: OnceLock<CString> = OnceLock::new();
    FFI.get_or_init(|| CString::new(FFI_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Reconciles a JSON array of backend payments against a membership window
/// and writes the ledger as JSON. `end` may be null for open memberships.
#[no_mangle]
pub extern "C" fn cuotas_reconcile_json(
    payments_json: *const c_char,
    start: *const c_char,
    end: *const c_char,
    utc_offset_minutes: c_int,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let result = (|| -> Result<String, CoreError> {
        let raw = unsafe { c_string_argument(payments_json) }?;
        let start = unsafe { c_string_argument(start) }?;
        let end = unsafe { optional_c_string(end) }?;
        let clock = offset_clock(utc_offset_minutes)?;
        let records: Vec<ApiPayment> =
            serde_json::from_str(&raw).map_err(|err| CoreError::Validation(err.to_string()))?;
        let payments = records
            .into_iter()
            .map(Payment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let ledger = api_parse_payments_to_ledger(&payments, &start, end.as_deref(), &clock);
        serde_json::to_string(&ledger).map_err(|err| CoreError::Serde(err.to_string()))
    })();
    unsafe { finish_json(result, out_json, out_error) }
}

/// Classifies backend debt counters. Accepts the backend field names
/// (`todosPagados`, `cantidadMesesMorosos`) or the snake_case ones.
#[no_mangle]
pub extern "C" fn cuotas_classify_summary_json(
    summary_json: *const c_char,
    out_status: *mut c_int,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let result = (|| -> Result<DebtStatus, CoreError> {
        let raw = unsafe { c_string_argument(summary_json) }?;
        let payload: SummaryPayload =
            serde_json::from_str(&raw).map_err(|err| CoreError::Validation(err.to_string()))?;
        Ok(api_classify_summary(&payload.into()))
    })();
    match result {
        Ok(status) => {
            if !out_status.is_null() {
                let code = match status {
                    DebtStatus::Debt => STATUS_DEBT,
                    DebtStatus::Current => STATUS_CURRENT,
                };
                unsafe {
                    *out_status = code;
                }
            }
            FfiErrorCategory::Ok.into()
        }
        Err(err) => unsafe { fail(out_error, err) },
    }
}

/// Full status of one backend member record (with embedded `pagos`).
/// `debt_source` is 0 for backend counters, 1 for the ledger rule.
#[no_mangle]
pub extern "C" fn cuotas_member_status_json(
    member_json: *const c_char,
    debt_source: c_int,
    utc_offset_minutes: c_int,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    clear_error(out_error);
    let result = (|| -> Result<String, CoreError> {
        let raw = unsafe { c_string_argument(member_json) }?;
        let source = match debt_source {
            0 => DebtSource::Backend,
            1 => DebtSource::Ledger,
            other => {
                return Err(CoreError::Validation(format!(
                    "unknown debt source code {}",
                    other
                )))
            }
        };
        let clock = offset_clock(utc_offset_minutes)?;
        let record: ApiMember =
            serde_json::from_str(&raw).map_err(|err| CoreError::Validation(err.to_string()))?;
        let status = api_member_status(MemberRecord::try_from(record)?, source, &clock);
        serde_json::to_string(&status).map_err(|err| CoreError::Serde(err.to_string()))
    })();
    unsafe { finish_json(result, out_json, out_error) }
}

/// Releases a string returned through `out_json` or `out_error`.
#[no_mangle]
pub extern "C" fn cuotas_string_free(value: *mut c_char) {
    if value.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(value));
    }
}

#[derive(Deserialize)]
struct SummaryPayload {
    #[serde(rename = "todosPagados", alias = "all_paid", default)]
    all_paid: bool,
    #[serde(
        rename = "cantidadMesesMorosos",
        alias = "overdue_month_count",
        default
    )]
    overdue_month_count: u32,
}

impl From<SummaryPayload> for DebtSummary {
    fn from(payload: SummaryPayload) -> Self {
        DebtSummary {
            all_paid: payload.all_paid,
            overdue_month_count: payload.overdue_month_count,
            ..DebtSummary::default()
        }
    }
}

fn offset_clock(minutes: c_int) -> Result<OffsetClock, CoreError> {
    OffsetClock::from_minutes(minutes)
        .ok_or_else(|| CoreError::Validation(format!("UTC offset {} is out of range", minutes)))
}

fn clear_error(out_error: *mut *mut c_char) {
    if out_error.is_null() {
        return;
    }
    unsafe {
        *out_error = ptr::null_mut();
    }
}

unsafe fn write_error(out_error: *mut *mut c_char, message: &str) {
    if out_error.is_null() {
        return;
    }
    if let Ok(cstring) = CString::new(message) {
        *out_error = cstring.into_raw();
    }
}

unsafe fn fail(out_error: *mut *mut c_char, err: CoreError) -> c_int {
    tracing::warn!(error = %err, "ffi call failed");
    write_error(out_error, &err.to_string());
    classify_error(&err).into()
}

unsafe fn finish_json(
    result: Result<String, CoreError>,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    let json = match result {
        Ok(json) => json,
        Err(err) => return fail(out_error, err),
    };
    if out_json.is_null() {
        write_error(out_error, "output pointer is null");
        return FfiErrorCategory::Validation.into();
    }
    match CString::new(json) {
        Ok(cstring) => {
            *out_json = cstring.into_raw();
            FfiErrorCategory::Ok.into()
        }
        Err(err) => fail(out_error, CoreError::Serde(err.to_string())),
    }
}

unsafe fn c_string_argument(value: *const c_char) -> Result<String, CoreError> {
    if value.is_null() {
        return Err(CoreError::Validation("null string pointer received".into()));
    }
    CStr::from_ptr(value)
        .to_str()
        .map(|s| s.to_string())
        .map_err(|err| CoreError::Validation(err.to_string()))
}

unsafe fn optional_c_string(value: *const c_char) -> Result<Option<String>, CoreError> {
    if value.is_null() {
        return Ok(None);
    }
    let text = c_string_argument(value)?;
    Ok((!text.trim().is_empty()).then_some(text))
}
