//! Electricity bill model
//!
//! One bill per calendar month. The scanned bill is kept inline as a data URL
//! so the local cache is self-contained.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::money::Money;
use super::month::MonthKey;
use crate::error::{MeterbookError, MeterbookResult};

/// Payment status of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BillStatus {
    Paid,
    #[default]
    Pending,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paid => write!(f, "Paid"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

impl FromStr for BillStatus {
    type Err = MeterbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(Self::Paid),
            "pending" => Ok(Self::Pending),
            other => Err(MeterbookError::Validation(format!(
                "Unknown bill status '{}', expected Paid or Pending",
                other
            ))),
        }
    }
}

/// Check that both payment fields are present, returning the trimmed mode
pub fn require_payment(
    date: Option<NaiveDate>,
    mode: Option<&str>,
    context: &str,
) -> MeterbookResult<(NaiveDate, String)> {
    let date = date.ok_or_else(|| {
        MeterbookError::MissingPaymentInfo(format!("Please enter a payment date for {}.", context))
    })?;
    let mode = mode.map(str::trim).filter(|m| !m.is_empty()).ok_or_else(|| {
        MeterbookError::MissingPaymentInfo(format!("Please enter a payment mode for {}.", context))
    })?;
    Ok((date, mode.to_string()))
}

/// An uploaded bill document stored as a data URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub data_url: String,
}

impl Attachment {
    /// Encode raw bytes as `data:<mime>;base64,<payload>`
    pub fn from_bytes(file_name: impl Into<String>, mime: &str, bytes: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub fn from_path(path: &Path) -> MeterbookResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(MeterbookError::MissingRequiredField("file"))?
            .to_string();
        let bytes = std::fs::read(path).map_err(|e| {
            MeterbookError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self::from_bytes(file_name, mime.essence_str(), &bytes))
    }

    /// MIME type declared in the data URL
    pub fn mime_type(&self) -> Option<&str> {
        self.data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
    }

    /// Decode the data URL payload back to bytes
    pub fn decode(&self) -> MeterbookResult<Vec<u8>> {
        let payload = self
            .data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or_else(|| {
                MeterbookError::Validation(format!(
                    "Bill attachment '{}' has no embedded data",
                    self.file_name
                ))
            })?;
        STANDARD
            .decode(payload)
            .map_err(|e| MeterbookError::Validation(format!("Corrupt bill attachment: {}", e)))
    }
}

/// A monthly electricity bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Billing month, unique across bills
    pub month_year: MonthKey,

    /// The bill document
    pub attachment: Attachment,

    /// Amount due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Money>,

    /// Units billed for the month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reading: Option<f64>,

    #[serde(default)]
    pub status: BillStatus,

    /// Present only when paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,

    /// Present only when paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
}

impl Bill {
    pub fn is_paid(&self) -> bool {
        self.status == BillStatus::Paid
    }

    /// Move the bill to a new status
    ///
    /// Paid needs a payment date and a non-blank mode. Pending always drops
    /// any payment details, whatever was supplied.
    pub fn update_status(
        &mut self,
        status: BillStatus,
        payment_date: Option<NaiveDate>,
        payment_mode: Option<&str>,
    ) -> MeterbookResult<()> {
        match status {
            BillStatus::Paid => {
                let (date, mode) = require_payment(payment_date, payment_mode, "paid bills")?;
                self.status = BillStatus::Paid;
                self.payment_date = Some(date);
                self.payment_mode = Some(mode);
            }
            BillStatus::Pending => {
                self.status = BillStatus::Pending;
                self.payment_date = None;
                self.payment_mode = None;
            }
        }
        Ok(())
    }

    /// Check the paid/payment-details invariant
    pub fn validate(&self) -> MeterbookResult<()> {
        match self.status {
            BillStatus::Paid => {
                require_payment(self.payment_date, self.payment_mode.as_deref(), "paid bills")?;
            }
            BillStatus::Pending => {
                if self.payment_date.is_some() || self.payment_mode.is_some() {
                    return Err(MeterbookError::Validation(
                        "Pending bills cannot carry payment details".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Raw input of the bill upload form
#[derive(Debug, Clone, Default)]
pub struct BillUpload {
    pub month_year: Option<MonthKey>,
    pub attachment: Option<Attachment>,
    pub total_amount: String,
    pub total_reading: String,
    pub status: BillStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_mode: Option<String>,
}

impl BillUpload {
    /// Validate the form and build the bill
    pub fn into_bill(self) -> MeterbookResult<Bill> {
        let month_year = self
            .month_year
            .ok_or(MeterbookError::MissingRequiredField("month"))?;
        let attachment = self
            .attachment
            .ok_or(MeterbookError::MissingRequiredField("file"))?;

        let total_amount = Money::parse(&self.total_amount)
            .ok()
            .filter(|m| m.is_positive())
            .ok_or_else(|| {
                MeterbookError::Validation("Please enter a valid, positive total amount.".into())
            })?;

        let total_reading = self
            .total_reading
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r >= 0.0)
            .ok_or_else(|| {
                MeterbookError::Validation(
                    "Please enter a valid, non-negative total reading.".into(),
                )
            })?;

        let mut bill = Bill {
            month_year,
            attachment,
            total_amount: Some(total_amount),
            total_reading: Some(total_reading),
            status: BillStatus::Pending,
            payment_date: None,
            payment_mode: None,
        };
        bill.update_status(self.status, self.payment_date, self.payment_mode.as_deref())?;
        Ok(bill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn august_bill() -> Bill {
        Bill {
            month_year: MonthKey::new(2024, 8).unwrap(),
            attachment: Attachment::from_bytes("august.pdf", "application/pdf", b"%PDF-1.4"),
            total_amount: Some(Money::parse("24100.00").unwrap()),
            total_reading: Some(2350.0),
            status: BillStatus::Pending,
            payment_date: None,
            payment_mode: None,
        }
    }

    fn upload() -> BillUpload {
        BillUpload {
            month_year: MonthKey::new(2024, 9),
            attachment: Some(Attachment::from_bytes("sept.pdf", "application/pdf", b"x")),
            total_amount: "21000".into(),
            total_reading: "2200".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_paid_requires_payment_date() {
        let mut bill = august_bill();
        let err = bill
            .update_status(BillStatus::Paid, None, Some("Online Banking"))
            .unwrap_err();
        assert!(matches!(err, MeterbookError::MissingPaymentInfo(_)));
        assert_eq!(bill.status, BillStatus::Pending);
    }

    #[test]
    fn test_paid_requires_non_blank_mode() {
        let mut bill = august_bill();
        let err = bill
            .update_status(BillStatus::Paid, Some(date(2024, 9, 5)), Some("   "))
            .unwrap_err();
        assert!(matches!(err, MeterbookError::MissingPaymentInfo(_)));
    }

    #[test]
    fn test_paid_then_pending_drops_payment() {
        let mut bill = august_bill();
        bill.update_status(BillStatus::Paid, Some(date(2024, 9, 5)), Some(" UPI "))
            .unwrap();
        assert!(bill.is_paid());
        assert_eq!(bill.payment_mode.as_deref(), Some("UPI"));

        bill.update_status(BillStatus::Pending, Some(date(2024, 9, 6)), Some("Cash"))
            .unwrap();
        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.payment_date, None);
        assert_eq!(bill.payment_mode, None);
        assert!(bill.validate().is_ok());
    }

    #[test]
    fn test_upload_validation_order() {
        let mut form = upload();
        form.attachment = None;
        form.total_amount = "0".into();
        assert!(matches!(
            form.into_bill(),
            Err(MeterbookError::MissingRequiredField("file"))
        ));

        let mut form = upload();
        form.total_amount = "0".into();
        assert!(matches!(form.into_bill(), Err(MeterbookError::Validation(_))));

        let mut form = upload();
        form.total_reading = "-1".into();
        assert!(matches!(form.into_bill(), Err(MeterbookError::Validation(_))));

        let mut form = upload();
        form.total_reading = "0".into();
        assert!(form.into_bill().is_ok());
    }

    #[test]
    fn test_upload_paid_needs_payment_info() {
        let mut form = upload();
        form.status = BillStatus::Paid;
        assert!(matches!(
            form.clone().into_bill(),
            Err(MeterbookError::MissingPaymentInfo(_))
        ));

        form.payment_date = Some(date(2024, 10, 2));
        form.payment_mode = Some("Credit Card".into());
        let bill = form.into_bill().unwrap();
        assert!(bill.is_paid());
        assert_eq!(bill.total_amount, Some(Money::from_minor(2100000)));
    }

    #[test]
    fn test_attachment_round_trip() {
        let attachment = Attachment::from_bytes("bill.pdf", "application/pdf", b"hello bill");
        assert!(attachment.data_url.starts_with("data:application/pdf;base64,"));
        assert_eq!(attachment.mime_type(), Some("application/pdf"));
        assert_eq!(attachment.decode().unwrap(), b"hello bill");
    }

    #[test]
    fn test_placeholder_attachment_cannot_decode() {
        let attachment = Attachment {
            file_name: "june_bill_sample.pdf".into(),
            data_url: "#".into(),
        };
        assert!(attachment.decode().is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("paid".parse::<BillStatus>().unwrap(), BillStatus::Paid);
        assert_eq!("Pending".parse::<BillStatus>().unwrap(), BillStatus::Pending);
        assert!("overdue".parse::<BillStatus>().is_err());
    }
}
