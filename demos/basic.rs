//! Basic example demonstrating the Dependency-Track client.
//!
//! Run with:
//! ```
//! DT_API_KEY=your-key DT_API_URL=https://dtrack.example.com/api/v1 cargo run --example basic
//! ```

use dtrack::{project_dependencies, DtClient, PrettyPrint};

#[tokio::main]
async fn main() -> dtrack::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Dependency-Track client...");
    let client = DtClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // List projects, keeping a few fields
    println!("\n--- Listing Projects ---");
    let projects = client
        .project()
        .list(Some(&["uuid", "name", "version"][..]), &[])
        .await?;
    println!("Found {} projects", projects.len());

    for project in projects.iter().take(10) {
        println!(
            "  - {} {} ({})",
            project.str_field("name").unwrap_or_default(),
            project.str_field("version").unwrap_or_default(),
            project.uuid().unwrap_or_default()
        );
    }

    // Get a specific project (using the first one from the list)
    let Some(uuid) = projects.first().and_then(|p| p.uuid()) else {
        return Ok(());
    };
    let Some(project) = client.project().get(uuid, None).await? else {
        println!("Project {uuid} disappeared");
        return Ok(());
    };

    println!("\n--- Project Details ---");
    println!("{}", project.pretty_print());

    // Components are listed through the project-scoped endpoint
    println!("\n--- Components ---");
    let components = project.component().list(None, &[]).await?;
    println!("Found {} components", components.len());
    for component in components.iter().take(5) {
        println!(
            "  - {}",
            component
                .str_field("purl")
                .or_else(|| component.str_field("name"))
                .unwrap_or("(unnamed)")
        );
    }

    // Walk the direct dependencies without resolving internal projects
    println!("\n--- Dependencies ---");
    let mut walk = project_dependencies(&client, project.data(), "", &[])?;
    while let Some(record) = walk.next().await {
        let record = record?;
        println!(
            "  - {} [{}]",
            record.dependency_url.as_deref().unwrap_or("(none)"),
            record.dependency_classifier.as_deref().unwrap_or("?")
        );
    }

    println!("\nDone!");
    Ok(())
}
