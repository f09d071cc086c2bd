use html_escape::{encode_double_quoted_attribute, encode_text};
use url::Url;

const BRAND_NAME: &str = "MUA Accounts";

fn primary_button(url: &str, label: &str) -> String {
    let url = encode_double_quoted_attribute(url);
    format!(
        r#"<a href="{url}" style="display:inline-block;padding:12px 18px;background-color:#111827;color:#ffffff;text-decoration:none;border-radius:8px;font-weight:600;">{label}</a>"#
    )
}

/// `{app_origin}/accounts/{url_friendly_name}/{page}?token=...`
fn token_link(app_origin: &Url, url_friendly_name: &str, page: &str, token: &str) -> String {
    let mut link = app_origin.clone();
    link.set_path(&format!("accounts/{url_friendly_name}/{page}"));
    link.query_pairs_mut().clear().append_pair("token", token);
    link.to_string()
}

pub fn invitation_email(
    app_origin: &Url,
    account_name: &str,
    url_friendly_name: &str,
    token: &str,
) -> (String, String) {
    let subject = format!("You have been invited to {account_name}");
    let link = token_link(app_origin, url_friendly_name, "accept-invitation", token);
    // Account names come from open sign-up.
    let account_name = encode_text(account_name);
    let lead = format!(
        "You have been invited to join <strong>{account_name}</strong>. Set a password to activate your user."
    );
    let html = wrap_email(
        "You're invited",
        &lead,
        &primary_button(&link, "Accept invitation"),
    );
    (subject, html)
}

pub fn registration_email(
    app_origin: &Url,
    account_name: &str,
    url_friendly_name: &str,
    token: &str,
) -> (String, String) {
    let subject = format!("Finish setting up {account_name}");
    let link = token_link(app_origin, url_friendly_name, "finalize-registration", token);
    let account_name = encode_text(account_name);
    let lead = format!(
        "Your account <strong>{account_name}</strong> has been created. Confirm your registration to become its administrator."
    );
    let html = wrap_email(
        "Confirm your registration",
        &lead,
        &primary_button(&link, "Finalize registration"),
    );
    (subject, html)
}

fn wrap_email(headline: &str, lead: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <body style="margin:0;padding:24px;background-color:#f3f4f6;font-family:Arial,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background-color:#ffffff;border-radius:12px;padding:32px;">
      <p style="margin:0 0 8px;color:#6b7280;font-size:13px;">{BRAND_NAME}</p>
      <h1 style="margin:0 0 16px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 24px;color:#374151;">{lead}</p>
      {body}
    </div>
  </body>
</html>"#
    )
}
