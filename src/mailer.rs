use std::path::Path;

use lettre::message::{Attachment, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::{Config, SmtpSettings};
use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::receipt_gen::{Receipt, ReceiptGenerator};

fn mail_error(err: impl std::fmt::Display) -> SalonError {
    SalonError::Mail(err.to_string())
}

/// A message with one file attached.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Send `mail` with the file at `attachment` over SMTP.
///
/// Real PDFs go out as `application/pdf`; the Markdown fallback is sent as plain text.
/// This blocks on the SMTP round trip.
pub fn send_with_attachment(
    settings: SmtpSettings<'_>,
    mail: &OutgoingMail,
    attachment: &Path,
) -> SalonResult<()> {
    let content = std::fs::read(attachment)?;
    let media_type = if content.starts_with(b"%PDF") {
        mime::APPLICATION_PDF
    } else {
        mime::TEXT_PLAIN_UTF_8
    };
    let content_type = ContentType::parse(media_type.as_ref()).map_err(mail_error)?;

    let filename = attachment
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt.pdf".to_string());

    let email = Message::builder()
        .from(settings.from.parse().map_err(mail_error)?)
        .to(mail.to.parse().map_err(mail_error)?)
        .subject(mail.subject.as_str())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.clone()))
                .singlepart(Attachment::new(filename).body(content, content_type)),
        )
        .map_err(mail_error)?;

    let creds = Credentials::new(settings.username.to_string(), settings.password.to_string());
    let transport = SmtpTransport::relay(settings.host)
        .map_err(mail_error)?
        .credentials(creds)
        .build();

    transport.send(&email).map_err(mail_error)?;
    tracing::info!(to = %mail.to, "Mail sent");
    Ok(())
}

/// Generate the receipt for a consultation and mail it to the client.
///
/// The pandoc run and the SMTP round trip happen on the blocking pool.
/// Returns the address it was sent to.
pub async fn email_receipt(
    store: &dyn Store,
    config: &Config,
    consultation_id: i32,
) -> SalonResult<String> {
    if config.smtp().is_none() {
        return Err(SalonError::validation("SMTP is not configured"));
    }
    let receipt = Receipt::load(store, consultation_id).await?;
    let to = receipt
        .client
        .as_ref()
        .and_then(|c| c.email.clone())
        .ok_or_else(|| SalonError::validation("The client has no email address"))?;

    let mail = OutgoingMail {
        to: to.clone(),
        subject: format!("{} - receipt #{}", config.business_name, consultation_id),
        body: format!(
            "Hello,\n\nThank you for your visit. Your receipt for {:.2} is attached.\n\n{}",
            receipt.consultation.amount, config.business_name
        ),
    };

    let config = config.clone();
    tokio::task::spawn_blocking(move || -> SalonResult<()> {
        let settings = config
            .smtp()
            .ok_or_else(|| SalonError::validation("SMTP is not configured"))?;
        let generator = ReceiptGenerator::new(&config.receipts_dir, &config.business_name)?;
        let (_, pdf_path) = generator.generate(&receipt)?;
        send_with_attachment(settings, &mail, &pdf_path)
    })
    .await??;

    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_email_receipt_requires_smtp() {
        let store = MemoryStore::new();
        let err = email_receipt(&store, &Config::default(), 1).await.unwrap_err();
        assert!(matches!(err, SalonError::Validation(_)));
    }
}
