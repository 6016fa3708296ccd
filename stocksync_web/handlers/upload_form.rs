use axum::extract::Multipart;
use std::collections::BTreeSet;
use uuid::Uuid;

use stocksync_app::cqrs::commands::CreateSyncJob;
use stocksync_types::{errors::AppError, pricing::PriceRounding};

/// Fields of the job creation form, as sent by the browser.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub file: Option<Vec<u8>>,
    pub chunk_size: Option<String>,
    pub dry_run: bool,
    pub prezero: bool,
    pub prezero_cats: Option<String>,
    pub price_adjust_amount: Option<String>,
    pub price_adjust_round: Option<String>,
    pub save_price_adjust: bool,
}

#[derive(Debug)]
pub(crate) enum FormError {
    Malformed(String),
    MissingFile,
    Invalid(AppError),
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Malformed(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| FormError::Malformed(e.body_text()))?;
                form.file = Some(bytes.to_vec());
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| FormError::Malformed(e.body_text()))?;
            match name.as_str() {
                "chunk_size" => form.chunk_size = non_blank(value),
                "dry_run" => form.dry_run = is_checked(&value),
                "prezero" => form.prezero = is_checked(&value),
                "prezero_cats" => form.prezero_cats = non_blank(value),
                "price_adjust_amount" => form.price_adjust_amount = non_blank(value),
                "price_adjust_round" => form.price_adjust_round = non_blank(value),
                "save_price_adjust" => form.save_price_adjust = is_checked(&value),
                _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    pub fn into_command(self, owner_id: Uuid) -> Result<CreateSyncJob, FormError> {
        let csv = self.file.ok_or(FormError::MissingFile)?;
        let mut command = CreateSyncJob::new(owner_id, csv);

        command.chunk_size = match self.chunk_size {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                FormError::Malformed(format!("Invalid chunk_size '{raw}'"))
            })?),
            None => None,
        };
        command.dry_run = self.dry_run;
        command.pre_zero = self.prezero;
        command.pre_zero_categories = match self.prezero_cats {
            Some(raw) => parse_category_ids(&raw).map_err(FormError::Invalid)?,
            None => BTreeSet::new(),
        };
        command.price_adjust_amount = match self.price_adjust_amount {
            Some(raw) => Some(parse_amount(&raw).map_err(FormError::Invalid)?),
            None => None,
        };
        command.price_adjust_round = match self.price_adjust_round {
            Some(raw) => Some(
                raw.parse::<PriceRounding>()
                    .map_err(|_| FormError::Invalid(AppError::InvalidPriceAdjust(raw)))?,
            ),
            None => None,
        };
        command.save_price_adjust = self.save_price_adjust;

        Ok(command)
    }
}

/// Comma separated category ids. Blank items are skipped.
pub(crate) fn parse_category_ids(raw: &str) -> Result<BTreeSet<i64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(AppError::InvalidCategoryId(s.to_string())),
        })
        .collect()
}

fn parse_amount(raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::InvalidPriceAdjust(raw.to_string()))
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_ids() {
        assert_eq!(
            parse_category_ids(" 4, 9,,4 ").unwrap(),
            BTreeSet::from([4, 9])
        );
        assert!(parse_category_ids("").unwrap().is_empty());
        assert!(matches!(
            parse_category_ids("4,shoes"),
            Err(AppError::InvalidCategoryId(ref s)) if s == "shoes"
        ));
        assert!(parse_category_ids("-3").is_err());
    }

    #[test]
    fn test_into_command() {
        let owner_id = Uuid::new_v4();
        let form = UploadForm {
            file: Some(b"Sku,Available,Price\n".to_vec()),
            chunk_size: Some("50".to_string()),
            dry_run: true,
            prezero: true,
            prezero_cats: Some("12,15".to_string()),
            price_adjust_amount: Some("-2,5".to_string()),
            price_adjust_round: Some("integer".to_string()),
            save_price_adjust: true,
        };

        let command = form.into_command(owner_id).unwrap();

        assert_eq!(command.owner_id, owner_id);
        assert_eq!(command.chunk_size, Some(50));
        assert!(command.dry_run);
        assert!(command.pre_zero);
        assert_eq!(command.pre_zero_categories, BTreeSet::from([12, 15]));
        assert_eq!(command.price_adjust_amount, Some(-2.5));
        assert_eq!(command.price_adjust_round, Some(PriceRounding::Integer));
        assert!(command.save_price_adjust);
    }

    #[test]
    fn test_into_command_rejects_bad_values() {
        let missing_file = UploadForm::default().into_command(Uuid::new_v4());
        assert!(matches!(missing_file, Err(FormError::MissingFile)));

        let form = UploadForm {
            file: Some(Vec::new()),
            price_adjust_round: Some("up".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            form.into_command(Uuid::new_v4()),
            Err(FormError::Invalid(AppError::InvalidPriceAdjust(_)))
        ));

        let form = UploadForm {
            file: Some(Vec::new()),
            chunk_size: Some("many".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            form.into_command(Uuid::new_v4()),
            Err(FormError::Malformed(_))
        ));
    }

    #[test]
    fn test_is_checked() {
        assert!(is_checked("1"));
        assert!(is_checked("on"));
        assert!(is_checked("TRUE"));
        assert!(!is_checked("0"));
        assert!(!is_checked(""));
    }
}
