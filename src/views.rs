//! Plain-text rendering of view state for the terminal.

use crate::auth::Session;
use crate::catalog::{CatalogState, ScholarshipDetail};
use crate::checkout::CheckoutOutcome;
use crate::dashboard::{MenuItem, Overview};
use crate::models::{AdminStats, Application, ApplicationStatus, Review, Scholarship, User};

fn fee(amount: u32) -> String {
    if amount == 0 { "free".to_string() } else { format!("${amount}") }
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

pub fn scholarship_line(s: &Scholarship) -> String {
    let mut line = format!("{}  {} - {}", s.id, s.scholarship_name, s.university_name);
    let location = s.location();
    if !location.is_empty() {
        line.push_str(&format!(" ({location})"));
    }
    line.push_str(&format!(
        " | {} | {} | fee {} | deadline {}",
        s.scholarship_category,
        s.degree,
        fee(s.application_fees),
        s.application_deadline
    ));
    line
}

pub fn scholarship_list(items: &[Scholarship], state: &CatalogState) -> String {
    if items.is_empty() {
        return "No scholarships found.\n".to_string();
    }
    let mut out = String::new();
    for s in items {
        out.push_str(&scholarship_line(s));
        out.push('\n');
    }
    out.push_str(&format!("Page {} of {}", state.page(), state.total_pages()));
    if let Some(total) = state.total() {
        out.push_str(&format!(" ({total} scholarships)"));
    }
    out.push('\n');
    out
}

pub fn scholarship_detail(detail: &ScholarshipDetail) -> String {
    let s = &detail.scholarship;
    let mut out = format!("{}\n{}\n", s.scholarship_name, s.university_name);
    let location = s.location();
    if !location.is_empty() {
        out.push_str(&format!("Location:        {location}\n"));
    }
    if let Some(rank) = s.university_world_rank {
        out.push_str(&format!("World rank:      #{rank}\n"));
    }
    out.push_str(&format!("Subject:         {}\n", s.subject_category));
    out.push_str(&format!("Category:        {}\n", s.scholarship_category));
    out.push_str(&format!("Degree:          {}\n", s.degree));
    if let Some(tuition) = s.tuition_fees {
        out.push_str(&format!("Tuition:         {}\n", fee(tuition)));
    }
    out.push_str(&format!("Application fee: {}\n", fee(s.application_fees)));
    out.push_str(&format!("Service charge:  {}\n", fee(s.service_charge)));
    out.push_str(&format!("Deadline:        {}\n", s.application_deadline));

    out.push_str(&format!("\nStudent Reviews ({})", detail.reviews.len()));
    if let Some(avg) = detail.average_rating() {
        out.push_str(&format!(" avg {avg:.1}/5"));
    }
    out.push('\n');
    if detail.reviews.is_empty() {
        out.push_str("No reviews yet.\n");
    }
    for r in &detail.reviews {
        out.push_str(&format!("  {} {}: {}\n", stars(r.rating_point), r.user_name, r.review_comment));
    }
    out
}

pub fn applications(items: &[Application]) -> String {
    if items.is_empty() {
        return "No applications.\n".to_string();
    }
    let mut out = String::new();
    for a in items {
        out.push_str(&format!(
            "{}  {} - {} | {} | {:?} | {}",
            a.id,
            a.scholarship_name,
            a.university_name,
            a.status,
            a.payment_status,
            fee(a.price)
        ));
        if let Some(email) = &a.user_email {
            out.push_str(&format!(" | {email}"));
        }
        if let Some(feedback) = a.feedback.as_deref().filter(|f| !f.is_empty()) {
            out.push_str(&format!(" | feedback: {feedback}"));
        }
        out.push('\n');
    }
    out
}

pub fn reviews(items: &[Review]) -> String {
    if items.is_empty() {
        return "No reviews.\n".to_string();
    }
    let mut out = String::new();
    for r in items {
        out.push_str(&format!(
            "{}  {} | {} | {}/5 | {}\n",
            r.id,
            r.scholarship_name.as_deref().unwrap_or("N/A"),
            r.university_name,
            r.rating_point,
            r.review_comment
        ));
    }
    out
}

pub fn users(items: &[User]) -> String {
    let mut out = String::new();
    for u in items {
        out.push_str(&format!(
            "{}  {} | {} | {}\n",
            u.id.as_deref().unwrap_or("-"),
            u.email,
            u.name.as_deref().unwrap_or(""),
            u.role
        ));
    }
    out
}

pub fn stats(s: &AdminStats) -> String {
    let mut out = format!(
        "Scholarships: {}\nApplications: {}\nUsers:        {}\nReviews:      {}\n",
        s.totals.scholarships, s.totals.applications, s.totals.users, s.totals.reviews
    );
    for status in [
        ApplicationStatus::Pending,
        ApplicationStatus::Processing,
        ApplicationStatus::Completed,
        ApplicationStatus::Rejected,
    ] {
        out.push_str(&format!("  {:<11} {}\n", status.as_str(), s.count_for(status)));
    }
    out
}

pub fn menu(items: &[MenuItem]) -> String {
    items.iter().map(|m| format!("- {}\n", m.label())).collect()
}

pub fn overview(o: &Overview) -> String {
    match o {
        Overview::Admin(s) => stats(s),
        Overview::Moderator => "Use Manage Applications or Manage Reviews.\n".to_string(),
        Overview::Student(s) => {
            let mut out = format!(
                "Total applications: {}\nPending:            {}\nCompleted:          {}\n\nRecent applications\n",
                s.total, s.pending, s.completed
            );
            out.push_str(&applications(&s.recent));
            out
        }
    }
}

pub fn session(s: Option<&Session>) -> String {
    match s {
        None => "Not signed in.\n".to_string(),
        Some(s) => format!(
            "{} <{}> ({})\n",
            s.display_name.as_deref().unwrap_or("(no name)"),
            s.email.as_deref().unwrap_or("no email"),
            s.role
        ),
    }
}

pub fn card_required(amount: u32) -> String {
    format!("Card details required to pay {}: pass --card-token.\n", fee(amount))
}

pub fn checkout_outcome(outcome: &CheckoutOutcome, inline_error: Option<&str>) -> String {
    match outcome {
        CheckoutOutcome::Aborted => match inline_error {
            Some(e) => format!("Payment not submitted: {e}\n"),
            None => "Nothing to pay for this scholarship.\n".to_string(),
        },
        CheckoutOutcome::Failed(f) => {
            let mut out = format!("Payment failed: {}\n", f.message);
            if f.application_id.is_some() {
                out.push_str("Your application was saved as unpaid; you can pay for it later.\n");
            }
            out
        }
        CheckoutOutcome::Succeeded(s) => format!(
            "Payment successful!\nScholarship:    {}\nUniversity:     {}\nAmount paid:    {}\nTransaction id: {}\n",
            s.scholarship_name,
            s.university_name,
            fee(s.amount),
            s.transaction_id
        ),
        CheckoutOutcome::RecordKeepingFailed(r) => format!(
            "Your payment of {} succeeded (transaction {}) but the application could not be saved: {}\n\
             Contact support with the transaction id.\n",
            fee(r.amount),
            r.transaction_id,
            r.message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{RecordAction, SuccessView};

    #[test]
    fn success_receipt_shows_amount_and_transaction() {
        let out = checkout_outcome(
            &CheckoutOutcome::Succeeded(SuccessView {
                transaction_id: "pi_123".into(),
                amount: 50,
                scholarship_name: "Global Excellence".into(),
                university_name: "Uni".into(),
                application_id: Some("A1".into()),
                record: RecordAction::Inserted,
            }),
            None,
        );
        assert!(out.contains("pi_123"));
        assert!(out.contains("$50"));
    }

    #[test]
    fn missing_card_is_not_reported_as_free() {
        let out = card_required(60);
        assert!(out.contains("--card-token"));
        assert!(out.contains("$60"));
        assert_ne!(out, checkout_outcome(&CheckoutOutcome::Aborted, None));
    }

    #[test]
    fn stars_are_clamped() {
        assert_eq!(stars(3), "***..");
        assert_eq!(stars(9), "*****");
    }
}
