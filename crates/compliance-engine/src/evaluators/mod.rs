//! Pure rule evaluators: `(typed input, market pack) -> (violations, fixes)`.
//! Every evaluator is I/O-free except [`good_cause`], which looks up CPI.

pub mod broker_fee;
pub mod disclosures;
pub mod fare_act;
pub mod gdpr;
pub mod good_cause;
pub mod rent_stabilization;
pub mod security_deposit;
