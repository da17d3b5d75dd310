//! Two-party signature state machine.
//!
//! ```text
//! pending ──student──▶ signed_by_student ──instructor──▶ completed
//!    └─────instructor──▶ signed_by_instructor ──student──┘
//! ```
//!
//! Signing stores the blob with a server-assigned timestamp and re-derives the
//! status from which signatures are present. Signing again after completion
//! replaces the blob but leaves the status at `completed`.

use chrono::NaiveDateTime;

use super::{EntryStatus, SignatureParty};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureState {
    pub student_signature: Option<String>,
    pub student_signature_date: Option<NaiveDateTime>,
    pub instructor_signature: Option<String>,
    pub instructor_signature_date: Option<NaiveDateTime>,
}

impl SignatureState {
    pub fn status(&self) -> EntryStatus {
        EntryStatus::from_signatures(
            self.student_signature.is_some(),
            self.instructor_signature.is_some(),
        )
    }

    /// Applies `party`'s signature and returns the resulting status.
    pub fn sign(
        &mut self,
        party: SignatureParty,
        signature: String,
        signed_at: NaiveDateTime,
    ) -> EntryStatus {
        match party {
            SignatureParty::Student => {
                self.student_signature = Some(signature);
                self.student_signature_date = Some(signed_at);
            }
            SignatureParty::Instructor => {
                self.instructor_signature = Some(signature);
                self.instructor_signature_date = Some(signed_at);
            }
        }
        self.status()
    }
}
