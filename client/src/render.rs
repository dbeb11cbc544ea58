use colored::*;
use services::anomaly_service::{AnomalyReport, NO_ANOMALIES_MESSAGE, Severity};
use services::ui::{Level, StatusTarget, UiEffect};

fn target_label(target: StatusTarget) -> &'static str {
    match target {
        StatusTarget::Session => "session",
        StatusTarget::CheckIn => "check-in",
        StatusTarget::Anomaly => "anomaly",
        StatusTarget::General => "status",
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = format!("{} risk", severity.label());
    match severity {
        Severity::High => label.red().bold(),
        Severity::Medium => label.yellow().bold(),
        Severity::Low => label.green(),
    }
}

fn report_lines(report: &AnomalyReport) -> Vec<String> {
    let mut lines = vec![
        "Anomaly report".bold().to_string(),
        format!("  Total records: {}", report.total_records),
        format!("  Anomaly count: {}", report.anomaly_count),
        format!("  Anomaly rate:  {}", report.anomaly_rate),
    ];

    if report.is_clean() {
        lines.push(format!("  {}", NO_ANOMALIES_MESSAGE.green()));
        return lines;
    }

    for card in &report.cards {
        lines.push(String::new());
        lines.push(format!(
            "  {} [{}]",
            format!("Anomaly #{}", card.index).bold(),
            severity_label(card.severity)
        ));
        lines.push(format!("    Student: {}", card.student));
        lines.push(format!("    Lecture: {}", card.lecture));
        lines.push(format!("    Time:    {}", card.recorded_at));
        lines.push(format!("    Type:    {}", card.anomaly_type.cyan()));
        lines.push(format!("    Score:   {}", card.score));
        lines.push(format!("    Reason:  {}", card.reason.dimmed()));
    }
    lines
}

pub fn render(effect: &UiEffect) {
    match effect {
        UiEffect::Navigate(page) => println!("{} {}", "->".dimmed(), page.to_string().bold()),
        UiEffect::LoginStatus(line) => println!("{}", line.blue()),
        UiEffect::ShowSignInForm => println!("{}", "Sign in or sign up to continue.".dimmed()),
        UiEffect::ShowDashboard => println!("{}", "Teacher dashboard ready.".dimmed()),
        UiEffect::Status {
            target,
            level,
            message,
        } => {
            let tag = format!("[{}]", target_label(*target));
            let text = match level {
                Level::Info => message.normal(),
                Level::Pending => message.blue(),
                Level::Success => message.green(),
                Level::Error => message.red(),
            };
            println!("{} {}", tag.dimmed(), text);
        }
        UiEffect::StartScanner => println!("{}", "Scanner started. Use 'scan <qr text>'.".dimmed()),
        UiEffect::StopScanner => println!("{}", "Scanner stopped.".dimmed()),
        UiEffect::RenderQr(text) => {
            println!("{}", "QR code content:".bold());
            println!("  {}", text.on_white().black());
        }
        UiEffect::ShowUnauthorized(message) => println!("{}", message.red().bold()),
        UiEffect::AnomalyReport(report) => {
            for line in report_lines(report) {
                println!("{line}");
            }
        }
        UiEffect::Alert(message) => println!("{} {}", "!".yellow().bold(), message),
    }
}
