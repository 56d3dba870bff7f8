use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};

use firelog::api::meldunki_client;
use firelog_common::dto::meldunki::{
    CreateMeldunekRequest, ListMeldunkiQuery, MeldunekDto, SortField, SortOrder,
};

use crate::Context;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    IncidentDate,
    CreatedAt,
}

impl From<SortArg> for SortField {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::IncidentDate => Self::IncidentDate,
            SortArg::CreatedAt => Self::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::Asc => Self::Asc,
            OrderArg::Desc => Self::Desc,
        }
    }
}

#[derive(Subcommand)]
pub enum MeldunkiAction {
    /// List reports of your department
    List {
        #[arg(long)]
        page: Option<u32>,
        /// Page size (1-100)
        #[arg(long)]
        limit: Option<u32>,
        /// Case-insensitive match on name, address or description
        #[arg(long)]
        search: Option<String>,
        /// Earliest incident date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest incident date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, value_enum)]
        sort_by: Option<SortArg>,
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one report
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// File a report from a JSON file
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a report
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: &MeldunkiAction, ctx: &Context) -> anyhow::Result<i32> {
    match action {
        MeldunkiAction::List {
            page,
            limit,
            search,
            from,
            to,
            sort_by,
            order,
            json,
        } => {
            let query = ListMeldunkiQuery {
                page: *page,
                limit: *limit,
                search: search.clone(),
                date_from: *from,
                date_to: *to,
                sort_by: sort_by.map(Into::into),
                order: order.map(Into::into),
            };
            cmd_list(ctx, &query, *json)
        }
        MeldunkiAction::Show { id, json } => cmd_show(ctx, id, *json),
        MeldunkiAction::Create { file } => cmd_create(ctx, file),
        MeldunkiAction::Delete { id, yes } => cmd_delete(ctx, id, *yes),
    }
}

fn cmd_list(ctx: &Context, query: &ListMeldunkiQuery, json: bool) -> anyhow::Result<i32> {
    let page = meldunki_client::list(&ctx.authorized()?, query)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(0);
    }
    if page.items.is_empty() {
        eprintln!("[firelog] no reports found");
    }
    for m in &page.items {
        println!(
            "{}  {}  {}  ({})",
            m.id, m.incident_date, m.incident_name, m.location_address
        );
    }
    let p = page.pagination;
    eprintln!(
        "[firelog] page {}/{} ({} total)",
        p.page,
        p.total_pages.max(1),
        p.total
    );
    Ok(0)
}

fn print_meldunek(m: &MeldunekDto) {
    println!("{}", m.incident_name);
    println!("  id:          {}", m.id);
    println!("  date:        {}", m.incident_date);
    println!("  address:     {}", m.location_address);
    println!("  start:       {}", m.start_time.to_rfc3339());
    if let Some(end) = m.end_time {
        println!("  end:         {}", end.to_rfc3339());
    }
    let optional = [
        ("commander", &m.commander),
        ("driver", &m.driver),
        ("forces", &m.forces_and_resources),
    ];
    for (label, value) in optional {
        if let Some(v) = value {
            println!("  {label:<12} {v}");
        }
    }
    println!();
    println!("{}", m.description);
}

fn cmd_show(ctx: &Context, id: &str, json: bool) -> anyhow::Result<i32> {
    let m = meldunki_client::get(&ctx.authorized()?, id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&m)?);
    } else {
        print_meldunek(&m);
    }
    Ok(0)
}

fn cmd_create(ctx: &Context, file: &std::path::Path) -> anyhow::Result<i32> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let req: CreateMeldunekRequest = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid report", file.display()))?;
    let m = meldunki_client::create(&ctx.authorized()?, &req)?;
    eprintln!("[firelog] Created report {}", m.id);
    println!("{}", m.id);
    Ok(0)
}

fn cmd_delete(ctx: &Context, id: &str, yes: bool) -> anyhow::Result<i32> {
    let client = ctx.authorized()?;
    if !yes {
        let m = meldunki_client::get(&client, id)?;
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete \"{}\" ({})?", m.incident_name, m.incident_date))
            .default(false)
            .interact()?;
        if !confirmed {
            eprintln!("[firelog] Aborted");
            return Ok(1);
        }
    }
    meldunki_client::delete(&client, id)?;
    eprintln!("[firelog] Deleted report {id}");
    Ok(0)
}
