// Inventory Page - HTML view of the private certificates and host details

use crate::api::{models::error::ApiError, state::AppState};
use crate::certificates::details::TIMESTAMP_FORMAT;
use axum::{
    extract::State,
    response::{Html, Redirect},
};
use handlebars::Handlebars;
use serde_json::json;
use std::sync::Arc;

const INVENTORY_TEMPLATE_NAME: &str = "inventory";

const INVENTORY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Certificate Inventory - {{system.hostname}}</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; background: #f5f5f5; padding: 20px; }
        .container { max-width: 1400px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        h1 { color: #2c3e50; margin-bottom: 10px; }
        h2 { color: #34495e; margin-top: 30px; margin-bottom: 15px; padding-bottom: 10px; border-bottom: 2px solid #3498db; }
        .summary-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin: 20px 0; }
        .summary-card { background: #f8f9fa; padding: 20px; border-radius: 8px; border-left: 4px solid #3498db; }
        .summary-card .value { font-size: 1.2em; font-weight: bold; color: #3498db; margin-top: 10px; word-break: break-all; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; font-size: 0.9em; }
        th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; vertical-align: top; }
        th { background: #34495e; color: white; }
        tr:hover { background: #f8f9fa; }
        code { font-size: 0.85em; word-break: break-all; }
        .status-Valid { color: #27ae60; font-weight: bold; }
        .status-Warning { color: #f39c12; font-weight: bold; }
        .status-Expired, .status-Error { color: #e74c3c; font-weight: bold; }
        .empty { color: #7f8c8d; font-style: italic; }
        .footer { margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #7f8c8d; text-align: center; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Certificate Inventory</h1>

        <section>
            <h2>System Information</h2>
            <div class="summary-grid">
                <div class="summary-card"><h3>Hostname</h3><div class="value">{{system.hostname}}</div></div>
                <div class="summary-card"><h3>WEBSITE_LOAD_CERTIFICATES</h3><div class="value">{{system.certificateEnvironmentVariable}}</div></div>
                <div class="summary-card"><h3>App Service Plan</h3><div class="value">{{system.appServicePlan}}</div></div>
            </div>
        </section>

        <section>
            <h2>Private Certificates</h2>
            {{#if certificates}}
            <table>
                <thead><tr><th>Name</th><th>Subject</th><th>Issuer</th><th>Valid Until</th><th>Days Left</th><th>Status</th><th>Thumbprint</th><th>Private Key</th></tr></thead>
                <tbody>
                {{#each certificates}}
                    <tr>
                        <td>{{name}}{{#if storeName}}<br><small>{{storeLocation}}/{{storeName}}</small>{{/if}}</td>
                        <td>{{subject}}</td>
                        <td>{{issuer}}</td>
                        <td>{{validUntil}}</td>
                        <td>{{daysLeft}}</td>
                        <td><span class="status-{{status}}">{{status}}</span>{{#if error}}<br><small>{{error}}</small>{{/if}}</td>
                        <td><code>{{thumbprint}}</code></td>
                        <td>{{#if hasPrivateKey}}Yes{{else}}No{{/if}}</td>
                    </tr>
                {{/each}}
                </tbody>
            </table>
            {{else}}
            <p class="empty">No private certificates found.</p>
            {{/if}}
        </section>

        <div class="footer">
            <p>Generated {{generated}}</p>
        </div>
    </div>
</body>
</html>"#;

/// Compile the page templates
pub fn templates() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars.register_template_string(INVENTORY_TEMPLATE_NAME, INVENTORY_TEMPLATE)?;
    Ok(handlebars)
}

/// Inventory page
pub async fn inventory_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let data = json!({
        "system": state.system_info(),
        "certificates": state.inventory.private_certificates().await,
        "generated": chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
    });

    let html = state
        .templates
        .render(INVENTORY_TEMPLATE_NAME, &data)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Html(html))
}

/// Redirect the site root to the inventory page
pub async fn redirect_to_inventory(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.config.routes.page)
}
