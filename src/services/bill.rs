//! Bill service
//!
//! Upload, status updates and attachment retrieval for the monthly bill
//! ledger. Bills live only in the local store.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::audit::EntityType;
use crate::error::{MeterbookError, MeterbookResult};
use crate::models::{Bill, BillStatus, BillUpload, MonthKey};
use crate::storage::Storage;

/// Service for bill management
pub struct BillService<'a> {
    storage: &'a Storage,
}

impl<'a> BillService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Validate an upload form and add the bill
    pub fn upload(&self, form: BillUpload) -> MeterbookResult<Bill> {
        let bill = form.into_bill()?;

        self.storage.bills.insert(bill.clone())?;
        self.storage.bills.save()?;

        self.storage.log_create(
            EntityType::Bill,
            bill.month_year.to_string(),
            Some(bill.attachment.file_name.clone()),
            &bill,
        )?;

        tracing::info!(month = %bill.month_year, status = %bill.status, "Bill uploaded");
        Ok(bill)
    }

    /// All bills, newest month first
    pub fn list(&self) -> MeterbookResult<Vec<Bill>> {
        self.storage.bills.get_all()
    }

    pub fn get(&self, month: MonthKey) -> MeterbookResult<Bill> {
        self.storage
            .bills
            .get(month)?
            .ok_or_else(|| MeterbookError::bill_not_found(month.to_string()))
    }

    /// Change a bill's status
    ///
    /// Paid needs a payment date and mode; Pending clears them.
    pub fn update_status(
        &self,
        month: MonthKey,
        status: BillStatus,
        payment_date: Option<NaiveDate>,
        payment_mode: Option<&str>,
    ) -> MeterbookResult<Bill> {
        let before = self.get(month)?;
        let mut bill = before.clone();
        bill.update_status(status, payment_date, payment_mode)?;

        self.storage.bills.update(bill.clone())?;
        self.storage.bills.save()?;

        self.storage.log_update(
            EntityType::Bill,
            month.to_string(),
            Some(bill.attachment.file_name.clone()),
            &before,
            &bill,
        )?;

        Ok(bill)
    }

    /// Write a bill's document to disk
    ///
    /// A directory destination gets the original file name.
    pub fn save_attachment(&self, month: MonthKey, dest: &Path) -> MeterbookResult<PathBuf> {
        let bill = self.get(month)?;
        let bytes = bill.attachment.decode()?;

        let target = if dest.is_dir() {
            dest.join(&bill.attachment.file_name)
        } else {
            dest.to_path_buf()
        };

        std::fs::write(&target, bytes).map_err(|e| {
            MeterbookError::Io(format!("Failed to write {}: {}", target.display(), e))
        })?;

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::MeterbookPaths;
    use crate::models::{Attachment, Money};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MeterbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn september_upload() -> BillUpload {
        BillUpload {
            month_year: MonthKey::new(2024, 9),
            attachment: Some(Attachment::from_bytes(
                "september.pdf",
                "application/pdf",
                b"%PDF-1.7 september",
            )),
            total_amount: "21,400.25".into(),
            total_reading: "2230".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_upload_and_list_descending() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let mut august = september_upload();
        august.month_year = MonthKey::new(2024, 8);
        service.upload(august).unwrap();
        let bill = service.upload(september_upload()).unwrap();

        assert_eq!(bill.total_amount, Some(Money::from_minor(2_140_025)));
        let months: Vec<String> = service
            .list()
            .unwrap()
            .iter()
            .map(|b| b.month_year.to_string())
            .collect();
        assert_eq!(months, vec!["2024-09", "2024-08"]);
    }

    #[test]
    fn test_duplicate_month_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        service.upload(september_upload()).unwrap();
        let err = service.upload(september_upload()).unwrap_err();
        assert!(matches!(err, MeterbookError::Duplicate { .. }));
    }

    #[test]
    fn test_update_status_round_trip() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        let month = MonthKey::new(2024, 9).unwrap();
        service.upload(september_upload()).unwrap();

        let err = service
            .update_status(month, BillStatus::Paid, Some(date(2024, 10, 3)), None)
            .unwrap_err();
        assert!(matches!(err, MeterbookError::MissingPaymentInfo(_)));
        assert_eq!(service.get(month).unwrap().status, BillStatus::Pending);

        let paid = service
            .update_status(month, BillStatus::Paid, Some(date(2024, 10, 3)), Some("UPI"))
            .unwrap();
        assert!(paid.is_paid());

        let pending = service
            .update_status(month, BillStatus::Pending, None, None)
            .unwrap();
        assert_eq!(pending.payment_date, None);
        assert_eq!(pending.payment_mode, None);

        let audit = storage.audit().read_all().unwrap();
        assert_eq!(audit.len(), 3);
        assert_eq!(audit[1].operation, Operation::Update);
        assert!(audit[1].diff_summary.as_deref().unwrap().contains("status"));
    }

    #[test]
    fn test_update_unknown_month() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);

        let err = service
            .update_status(MonthKey::new(2020, 1).unwrap(), BillStatus::Pending, None, None)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_attachment_into_directory() {
        let (temp_dir, storage) = create_test_storage();
        let service = BillService::new(&storage);
        service.upload(september_upload()).unwrap();

        let out_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&out_dir).unwrap();
        let written = service
            .save_attachment(MonthKey::new(2024, 9).unwrap(), &out_dir)
            .unwrap();

        assert_eq!(written, out_dir.join("september.pdf"));
        assert_eq!(std::fs::read(written).unwrap(), b"%PDF-1.7 september");
    }
}
