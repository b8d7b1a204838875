use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRow {
    pub id: String,
    pub appointment_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_status: Option<String>,
    pub paid_at: Option<String>,
}
