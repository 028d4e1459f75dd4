use anyhow::Result;
use chrono::Utc;
use colored::*;
use std::io::{self, Write};

use gate_entry::clients::{ClientConfig, ClientError, GateApiClient};
use gate_entry::config::EnvironmentConfig;
use gate_entry::models::vehicle::{Plant, VehicleRecord};
use gate_entry::services::duration::dwell_duration;
use gate_entry::services::{DashboardView, FilterCriteria, OverstayPolicy, OverstayTracker};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = EnvironmentConfig::from_env()?;
    let client = GateApiClient::new(ClientConfig::from_env())?;
    let mut tracker = OverstayTracker::new(OverstayPolicy::new(config.overstay_threshold_hours));

    println!("{}", "🚛 Gate Entry Console".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!("API: {}", client.base_url());

    loop {
        println!();
        println!("{}", "📋 MAIN MENU".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 📊 Show dashboard");
        println!("2. ➕ Register vehicle");
        println!("3. 🚪 Mark exit");
        println!("4. 📷 Read plate from image");
        println!("5. 👋 Quit");
        let choice = prompt("Choose an option (1-5): ")?;

        let outcome = match choice.as_str() {
            "1" => show_dashboard(&client, &config, &mut tracker).await,
            "2" => register_vehicle(&client).await,
            "3" => mark_exit(&client).await,
            "4" => read_plate(&client).await,
            "5" => {
                println!("{}", "👋 Bye!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Invalid option, try again.".bright_red());
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("{} {}", "❌".bright_red(), e.to_string().bright_red());
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Reload, render both tables, then raise alerts for new overstays only
async fn show_dashboard(client: &GateApiClient, config: &EnvironmentConfig, tracker: &mut OverstayTracker) -> Result<()> {
    let records = client.fetch_vehicles().await?;
    let now = Utc::now();
    let site = config.site_offset();

    let search = prompt("Search plate (enter for all): ")?;
    let criteria = FilterCriteria {
        search_text: Some(search).filter(|s| !s.is_empty()),
        ..Default::default()
    };
    let view = DashboardView::build(&records, &criteria, now, &site);

    println!();
    println!("{}", "📊 KPIs".bright_cyan().bold());
    println!("   Inside now:        {}", view.kpis.total_inside);
    println!("   Entered today:     {}", view.kpis.entered_today);
    println!("   Avg. duration:     {} min", view.kpis.avg_duration_minutes);
    println!("   Most common type:  {}", view.kpis.most_common_type_label());

    let policy = OverstayPolicy::new(config.overstay_threshold_hours);
    println!();
    println!("{}", format!("🟢 INSIDE ({})", view.inside.len()).bright_green().bold());
    for record in &view.inside {
        let line = row(record, now, &site);
        if policy.is_overstaying(record, now) {
            println!("{}", line.bright_red());
        } else {
            println!("{}", line);
        }
    }

    println!();
    println!("{}", format!("⚪ EXITED ({})", view.exited.len()).bright_white().bold());
    for record in &view.exited {
        println!("{}", row(record, now, &site));
    }

    for alert in tracker.refresh(&records, now) {
        println!("{}", alert.message().bright_red().bold());
    }
    Ok(())
}

fn row(record: &VehicleRecord, now: chrono::DateTime<Utc>, site: &chrono::FixedOffset) -> String {
    format!(
        "   {:<12} {:<16} {:<10} in {}  {}  [{}]",
        record.vehicle_no,
        record.vehicle_type.as_str(),
        record.plant.map(|p| p.as_str()).unwrap_or("N/A"),
        record.in_time.with_timezone(site).format("%b %d %H:%M"),
        dwell_duration(record.in_time, record.out_time, now),
        record.id,
    )
}

async fn register_vehicle(client: &GateApiClient) -> Result<()> {
    let vehicle_no = prompt("Vehicle No: ")?;
    let container = prompt("Container ID (optional): ")?;
    let plant: Plant = match prompt("Plant [Badalgama/Madampe]: ")?.as_str() {
        "" => Plant::Badalgama,
        other => other.parse().map_err(anyhow::Error::msg)?,
    };

    let container = Some(container.as_str()).filter(|c| !c.is_empty());
    match client.register(&vehicle_no, container, plant).await {
        Ok(created) => {
            println!("{}", created.message.bright_green());
            println!("   Type: {}", created.vehicle.vehicle_type);
            Ok(())
        }
        Err(e @ ClientError::DuplicateEntry { .. }) => {
            println!("{}", e.to_string().bright_yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn mark_exit(client: &GateApiClient) -> Result<()> {
    let id = prompt("Record id: ")?;
    let exited = client.mark_exit(&id).await?;
    println!("{}", exited.message.bright_green());
    Ok(())
}

async fn read_plate(client: &GateApiClient) -> Result<()> {
    let path = prompt("Image path: ")?;
    let image = std::fs::read(&path)?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.jpg")
        .to_string();

    let result = client.recognize_plate(image, &file_name).await?;
    println!("{}", "📷 OCR result".bright_cyan().bold());
    println!("   Raw text:     {}", result.text.as_deref().unwrap_or("-"));
    println!("   Vehicle No:   {}", result.vehicle_no.as_deref().unwrap_or("not found"));
    println!("   Container ID: {}", result.container_id.as_deref().unwrap_or("-"));
    println!("   Type:         {}", result.vehicle_type);
    println!("   Time:         {:.2}s", result.processing_time);
    Ok(())
}
