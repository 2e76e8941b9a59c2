use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealDeskError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid incentive plan '{plan_id}': {reason}")]
    InvalidPlan { plan_id: String, reason: String },

    #[error("Product already on quote: {0}")]
    DuplicateProduct(String),

    #[error("Line item not found: {0}")]
    LineItemNotFound(String),

    #[error("Invalid payment terms: {0}")]
    InvalidPaymentTerms(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DealDeskError {
    fn from(e: serde_json::Error) -> Self {
        DealDeskError::SerializationError(e.to_string())
    }
}
