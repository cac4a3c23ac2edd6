use tracing::info;

use cuotas_domain::{Member, MemberDraft, Payment, PaymentDraft, Roster};

use crate::CoreError;

/// Abstraction over the backends that hold members and their payments.
///
/// Services receive the store explicitly; there is no process-wide instance.
pub trait MemberStore: Send + Sync {
    fn list_members(&self) -> Result<Vec<Member>, CoreError>;
    fn member(&self, id: i64) -> Result<Member, CoreError>;
    fn insert_member(&mut self, draft: MemberDraft) -> Result<Member, CoreError>;
    fn update_member(&mut self, member: Member) -> Result<(), CoreError>;
    /// Removes the member together with all of their payments.
    fn delete_member(&mut self, id: i64) -> Result<Member, CoreError>;
    fn list_payments(&self) -> Result<Vec<Payment>, CoreError>;
    fn payments_for(&self, member_id: i64) -> Result<Vec<Payment>, CoreError>;
    fn insert_payment(&mut self, draft: PaymentDraft) -> Result<Payment, CoreError>;
    fn delete_payment(&mut self, id: i64) -> Result<Payment, CoreError>;
}

/// The in-memory roster is itself a store; file-backed stores wrap it.
impl MemberStore for Roster {
    fn list_members(&self) -> Result<Vec<Member>, CoreError> {
        Ok(self.members.clone())
    }

    fn member(&self, id: i64) -> Result<Member, CoreError> {
        Roster::member(self, id)
            .cloned()
            .ok_or(CoreError::MemberNotFound(id))
    }

    fn insert_member(&mut self, draft: MemberDraft) -> Result<Member, CoreError> {
        let id = self.next_member_id;
        self.next_member_id += 1;
        let mut member = Member::new(id, draft.full_name, draft.start_date);
        member.end_date = draft.end_date;
        self.members.push(member.clone());
        self.touch();
        info!(member = id, "member added");
        Ok(member)
    }

    fn update_member(&mut self, member: Member) -> Result<(), CoreError> {
        let id = member.id;
        let slot = self.member_mut(id).ok_or(CoreError::MemberNotFound(id))?;
        *slot = member;
        self.touch();
        info!(member = id, "member updated");
        Ok(())
    }

    fn delete_member(&mut self, id: i64) -> Result<Member, CoreError> {
        let position = self
            .members
            .iter()
            .position(|member| member.id == id)
            .ok_or(CoreError::MemberNotFound(id))?;
        let removed = self.members.remove(position);
        let before = self.payments.len();
        self.payments.retain(|payment| payment.owner_id != id);
        self.touch();
        info!(
            member = id,
            payments = before - self.payments.len(),
            "member removed"
        );
        Ok(removed)
    }

    fn list_payments(&self) -> Result<Vec<Payment>, CoreError> {
        Ok(self.payments.clone())
    }

    fn payments_for(&self, member_id: i64) -> Result<Vec<Payment>, CoreError> {
        Ok(Roster::payments_for(self, member_id))
    }

    fn insert_payment(&mut self, draft: PaymentDraft) -> Result<Payment, CoreError> {
        if Roster::member(self, draft.owner_id).is_none() {
            return Err(CoreError::MemberNotFound(draft.owner_id));
        }
        let id = self.next_payment_id;
        self.next_payment_id += 1;
        let payment = Payment::new(id, draft.owner_id, draft.month.to_string(), draft.amount);
        self.payments.push(payment.clone());
        self.touch();
        info!(payment = id, member = payment.owner_id, month = %draft.month, "payment recorded");
        Ok(payment)
    }

    fn delete_payment(&mut self, id: i64) -> Result<Payment, CoreError> {
        let position = self
            .payments
            .iter()
            .position(|payment| payment.id == id)
            .ok_or(CoreError::PaymentNotFound(id))?;
        let removed = self.payments.remove(position);
        self.touch();
        info!(payment = id, member = removed.owner_id, "payment removed");
        Ok(removed)
    }
}
