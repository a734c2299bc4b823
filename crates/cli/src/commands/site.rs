//! Public site commands: list project cards, send a contact message.

use portfolio_client::public::{BannerKind, LiveLink};
use portfolio_client::{ContactForm, ProjectCard, PublicSite};

/// Print every project card in display order.
///
/// # Errors
///
/// Returns an error if the project list cannot be fetched.
pub async fn projects(site: &PublicSite) -> Result<(), Box<dyn std::error::Error>> {
    let cards = site.load_projects().await?;
    if cards.is_empty() {
        print_line("No projects yet.");
    }
    for card in &cards {
        print_card(card);
    }
    Ok(())
}

/// Submit the contact form once and print the resulting banner.
///
/// # Errors
///
/// Returns an error when the server did not accept the message.
pub async fn contact(
    site: &PublicSite,
    mut form: ContactForm,
) -> Result<(), Box<dyn std::error::Error>> {
    let banner = site.submit_contact(&mut form).await;
    print_line(&banner.text);
    match banner.kind {
        BannerKind::Success => Ok(()),
        BannerKind::Error => Err("message was not sent".into()),
    }
}

#[allow(clippy::print_stdout)]
fn print_line(text: &str) {
    println!("{text}");
}

#[allow(clippy::print_stdout)]
fn print_card(card: &ProjectCard) {
    let mut badges = Vec::new();
    if card.featured {
        badges.push("Featured");
    }
    if card.in_progress {
        badges.push("In Progress");
    }

    println!();
    if badges.is_empty() {
        println!("{}", card.title);
    } else {
        println!("{}  [{}]", card.title, badges.join("] ["));
    }
    println!("  {}", card.description);
    if card.has_features() {
        println!("  Features: {}", card.features.join(" · "));
    }
    println!("  Tech: {}", card.technologies.join(", "));
    match &card.live {
        LiveLink::Url(url) => println!("  Live: {url}"),
        LiveLink::ComingSoon => println!("  Live: Coming Soon"),
    }
    if let Some(url) = &card.source_url {
        println!("  Source: {url}");
    }
}
