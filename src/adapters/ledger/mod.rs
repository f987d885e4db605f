pub mod json_audit_ledger;
