use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{Client, Consultation, Product, ProductLine, Service};

/// Everything printed on a receipt, gathered from the store.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub consultation: Consultation,
    pub client: Option<Client>,
    pub services: Vec<Service>,
    pub products: Vec<(ProductLine, Option<Product>)>,
}

impl Receipt {
    pub async fn load(store: &dyn Store, consultation_id: i32) -> SalonResult<Self> {
        let consultation = store
            .get_consultation(consultation_id)
            .await?
            .ok_or_else(|| SalonError::not_found("Consultation", consultation_id))?;
        let client = store.get_client(consultation.client_id).await?;

        let mut services = Vec::new();
        if let Some(appointment) = store.get_appointment(consultation.appointment_id).await? {
            for service_id in &appointment.service_ids {
                if let Some(service) = store.get_service(*service_id).await? {
                    services.push(service);
                }
            }
        }

        let mut products = Vec::with_capacity(consultation.products.len());
        for line in &consultation.products {
            products.push((*line, store.get_product(line.product_id).await?));
        }

        Ok(Self {
            consultation,
            client,
            services,
            products,
        })
    }

    pub fn file_stem(&self) -> String {
        format!(
            "receipt_{}_{}",
            self.consultation.date.format("%Y%m%d"),
            self.consultation.id
        )
    }

    /// Markdown body of the receipt.
    pub fn to_markdown(&self, business_name: &str) -> String {
        let mut content = String::new();

        content.push_str(&format!("# {}\n\n", business_name));
        content.push_str(&format!("## Receipt #{}\n\n", self.consultation.id));
        content.push_str(&format!("**Date:** {}\n\n", self.consultation.date.format("%d/%m/%Y")));

        match &self.client {
            Some(client) => {
                content.push_str(&format!("**Client:** {}  \n", client.name));
                content.push_str(&format!("**Phone:** {}\n\n", client.phone));
            }
            None => content.push_str("**Client:** (deleted client)\n\n"),
        }

        content.push_str("| Service | Category | Price |\n");
        content.push_str("|---|---|---:|\n");
        for service in &self.services {
            content.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                service.name, service.category, service.price
            ));
        }
        content.push('\n');

        if !self.products.is_empty() {
            content.push_str("**Products used**\n\n");
            for (line, product) in &self.products {
                let name = product
                    .as_ref()
                    .map_or_else(|| format!("Product #{}", line.product_id), |p| p.name.clone());
                content.push_str(&format!("- {} x{}\n", name, line.quantity));
            }
            content.push('\n');
        }

        if let Some(notes) = &self.consultation.notes {
            content.push_str(&format!("**Notes:** {}\n\n", notes));
        }

        content.push_str("---\n\n");
        content.push_str(&format!(
            "**Paid ({}):** {:.2}\n",
            self.consultation.payment_method, self.consultation.amount
        ));

        content
    }
}

/// Writes receipts as Markdown and, when `pandoc` is installed, as PDF.
pub struct ReceiptGenerator {
    output_dir: PathBuf,
    business_name: String,
}

impl ReceiptGenerator {
    pub fn new(output_dir: impl AsRef<Path>, business_name: &str) -> SalonResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir)?;
        }

        Ok(Self {
            output_dir,
            business_name: business_name.to_string(),
        })
    }

    /// Returns the Markdown path and the PDF path.
    ///
    /// Without a working `pandoc` the PDF path holds a copy of the Markdown text.
    pub fn generate(&self, receipt: &Receipt) -> SalonResult<(PathBuf, PathBuf)> {
        let stem = receipt.file_stem();
        let md_path = self.output_dir.join(format!("{stem}.md"));
        let pdf_path = self.output_dir.join(format!("{stem}.pdf"));

        let markdown = receipt.to_markdown(&self.business_name);
        fs::write(&md_path, &markdown)?;

        match Command::new("pandoc").arg(&md_path).arg("-o").arg(&pdf_path).output() {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                tracing::warn!(
                    "pandoc failed, writing Markdown copy instead: {}",
                    String::from_utf8_lossy(&output.stderr)
                );
                fs::write(&pdf_path, &markdown)?;
            }
            Err(e) => {
                tracing::warn!("Could not run pandoc, writing Markdown copy instead: {}", e);
                fs::write(&pdf_path, &markdown)?;
            }
        }

        tracing::info!(
            consultation_id = receipt.consultation.id,
            path = %md_path.display(),
            "Receipt generated"
        );
        Ok((md_path, pdf_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewConsultation, PaymentMethod};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_receipt_for_deleted_client_and_product() {
        let store = MemoryStore::new();
        let consultation = store
            .insert_consultation(&NewConsultation {
                appointment_id: 1,
                client_id: 77,
                products: vec![ProductLine { product_id: 9, quantity: 2 }],
                amount: 45.5,
                payment_method: PaymentMethod::Transfer,
                date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
                notes: None,
            })
            .await
            .unwrap();

        let receipt = Receipt::load(&store, consultation.id).await.unwrap();
        let markdown = receipt.to_markdown("Salon");

        assert!(markdown.contains("(deleted client)"));
        assert!(markdown.contains("Product #9 x2"));
        assert!(markdown.contains("**Paid (transfer):** 45.50"));
        assert_eq!(receipt.file_stem(), format!("receipt_20240203_{}", consultation.id));
    }

    #[tokio::test]
    async fn test_missing_receipt() {
        let store = MemoryStore::new();
        assert!(matches!(
            Receipt::load(&store, 5).await,
            Err(SalonError::NotFound { entity: "Consultation", id: 5 })
        ));
    }
}
