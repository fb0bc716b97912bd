use serde::{Deserialize, Serialize};

/// Inbound contact form payload. No field is validated; empty strings are
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Acknowledgment returned to the sender. Nothing is delivered or stored;
/// a real mail adapter would hang off the service layer later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub reply: String,
}

/// Produce the confirmation for a message, referencing the sender by name.
pub fn acknowledge(message: &ContactMessage) -> ContactReceipt {
    ContactReceipt {
        reply: format!("Thank you, {}. Your message has been sent!", message.name),
    }
}
