use std::env;

use anyhow::{anyhow, Context};
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

fn build_mailer() -> Result<AsyncSmtpTransport<Tokio1Executor>, anyhow::Error> {
    let smtp_server = env::var("SMTP_SERVER").context("Missing SMTP_SERVER env var")?;
    let smtp_port: u16 = env::var("SMTP_PORT")
        .context("Missing SMTP_PORT env var")?
        .parse()
        .context("SMTP_PORT must be a valid u16 integer")?;
    let smtp_username = env::var("SMTP_USERNAME").context("Missing SMTP_USERNAME env var")?;
    let smtp_password = env::var("SMTP_PASSWORD").context("Missing SMTP_PASSWORD env var")?;

    let creds = Credentials::new(smtp_username, smtp_password);

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_server)
        .context("Failed to create SMTP relay")?
        .port(smtp_port)
        .credentials(creds)
        .build();
    Ok(mailer)
}

async fn send_plain(to_email: &str, subject: &str, body: String) -> Result<(), anyhow::Error> {
    let smtp_from = env::var("SMTP_FROM").context("Missing SMTP_FROM env var")?;

    let from_mailbox = smtp_from
        .parse::<Mailbox>()
        .context("Invalid SMTP_FROM email address")?;
    let to_mailbox = to_email
        .trim()
        .parse::<Mailbox>()
        .context("Invalid recipient email address")?;

    let email = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(subject)
        .header(lettre::message::header::ContentType::TEXT_PLAIN)
        .body(body)
        .context("Failed to build email message")?;

    let mailer = build_mailer()?;

    mailer.send(email).await.map_err(|e| {
        eprintln!("Email sending error: {}", e);
        anyhow!("Failed to send email: {}", e)
    })?;
    Ok(())
}

pub async fn send_verification_code_email(to_email: &str, code: &str) -> Result<(), anyhow::Error> {
    send_plain(
        to_email,
        "Inntro: Your verification code",
        format!(
            "Your Inntro verification code is:\n\n{}\n\nIt expires in 15 minutes. If you did not request this, please ignore this email.",
            code
        ),
    )
    .await
}

pub async fn send_partner_invite_email(to_email: &str, code: &str) -> Result<(), anyhow::Error> {
    send_plain(
        to_email,
        "Your friend invited you to Inntro!",
        format!(
            "Your friend wants you on their Inntro crew.\n\nEnter this code on the signup screen to join their pair:\n\n{}\n\nThe code expires in 7 days.",
            code
        ),
    )
    .await
}

pub async fn send_access_request_email(
    requester_email: &str,
    university: Option<&str>,
    instagram: Option<&str>,
    approval_token: Uuid,
) -> Result<(), anyhow::Error> {
    let support_email = env::var("SUPPORT_EMAIL").context("Missing SUPPORT_EMAIL env var")?;
    let base_url = env::var("APP_BASE_URL").context("Missing APP_BASE_URL env var")?;

    send_plain(
        &support_email,
        "New Inntro access request",
        format!(
            "Email: {}\nUniversity: {}\nInstagram: {}\n\nApprove: {}/api/v1/access/respond?token={}&approved=true\nReject: {}/api/v1/access/respond?token={}&approved=false",
            requester_email,
            university.unwrap_or("-"),
            instagram.unwrap_or("-"),
            base_url,
            approval_token,
            base_url,
            approval_token,
        ),
    )
    .await
}

pub async fn send_access_approved_email(to_email: &str, code: &str) -> Result<(), anyhow::Error> {
    send_plain(
        to_email,
        "Welcome to Inntro!",
        format!(
            "Your access request has been approved. Here is your access code:\n\n{}\n\nIt expires in 7 days. Enter it on the login screen to get started!",
            code
        ),
    )
    .await
}

pub async fn send_access_rejected_email(to_email: &str) -> Result<(), anyhow::Error> {
    send_plain(
        to_email,
        "Inntro access request update",
        "Thank you for your interest in Inntro. Unfortunately we are unable to approve your access request at this time.\n\nFeel free to apply again in the future!".to_string(),
    )
    .await
}
