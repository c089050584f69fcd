//! Rendering of the sync view
//!
//! Content is only rendered from a `Ready` view; every other phase renders the
//! fetching placeholder.

mod view;

pub use view::SyncView;

use crate::models::UnifiedOtpService;
use colored::Colorize;

pub const PLACEHOLDER: &str = "Fetching auth data...";

/// Render a view as terminal text
pub fn render_view(view: &SyncView) -> String {
    let Some(services) = view.content() else {
        let mut out = PLACEHOLDER.to_string();
        if let Some(reason) = view.halt {
            out.push_str(&format!("\n{}", format!("({})", reason.describe()).bright_black()));
        }
        return out;
    };

    if services.is_empty() {
        return "No OTP services found.".yellow().to_string();
    }

    let mut out = format!("{}\n", format!("{} OTP services", services.len()).cyan().bold());
    for service in services {
        out.push_str(&render_service(service));
        out.push('\n');
    }
    out
}

fn render_service(service: &UnifiedOtpService) -> String {
    let mut line = format!("  {}", service.display_name().bold());
    if let Some(account) = &service.account {
        line.push_str(&format!("  {}", account));
    }
    if service.app.is_none() {
        line.push_str(&format!("  {}", "(no app)".bright_black()));
    }
    line
}
