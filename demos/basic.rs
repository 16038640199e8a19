//! Basic example demonstrating the Get Satisfaction API client.
//!
//! Run with:
//! ```
//! GETSAT_COMPANY=acme cargo run --example basic
//! ```

use getsat::{GetSatClient, Resource};

#[tokio::main]
async fn main() -> getsat::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Get Satisfaction client...");
    let client = GetSatClient::from_env()?;
    println!("Connected to: {}", client.config().api_url);

    let company = std::env::var("GETSAT_COMPANY").unwrap_or_else(|_| "getsatisfaction".into());
    let mut tree = client.endpoints()?;

    // The company itself
    println!("\n--- Company ---");
    let id = tree.navigate(&[("companies", Some(company.as_str()))])?;
    let details = client.fetch_node(&tree, id, &[]).await?;
    for resource in details.into_vec() {
        println!("{}", resource.title().unwrap_or(&company));
    }

    // Recently active topics for the company
    println!("\n--- Recent Topics ---");
    let topics = tree.navigate(&[("companies", Some(company.as_str())), ("topics", None)])?;
    let topics = client
        .fetch_node(&tree, topics, &[("sort", "recently_active")])
        .await?
        .into_vec();
    println!("Found {} topics", topics.len());
    for topic in topics.iter().take(5) {
        print_topic(topic);
    }

    // Employees
    println!("\n--- Employees ---");
    let employees = tree.navigate(&[("companies", Some(company.as_str())), ("employees", None)])?;
    for person in client.fetch_node(&tree, employees, &[]).await?.into_vec() {
        println!("  - {}", person.str("name").unwrap_or("unknown"));
    }

    println!("\nDone!");
    Ok(())
}

fn print_topic(topic: &Resource) {
    let subject = topic.str("subject").unwrap_or("(no subject)");
    let author = topic
        .nested("author")
        .and_then(|a| a.str("name"))
        .unwrap_or("anonymous");
    match topic.timestamp("last_active_at") {
        Some(at) => println!("  - {subject} by {author} (active {})", at.format("%Y-%m-%d")),
        None => println!("  - {subject} by {author}"),
    }
}
