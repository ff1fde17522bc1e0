use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use engagement_dashboard::compare::{GroupBy, GroupKpi, GroupSort, GroupSortField};
use engagement_dashboard::config::{self, OutputFormat};
use engagement_dashboard::filters::{ClientMetricFilter, DateRange, ProjectFilter};
use engagement_dashboard::ingest::{self, IngestOptions};
use engagement_dashboard::models::{ClientMetricField, ProjectField};
use engagement_dashboard::report;
use engagement_dashboard::sort::{ClientMetricSort, ProjectSort, SortDirection};
use engagement_dashboard::state::{ClientMetricsDashboard, ProjectDashboard, Snapshot};
use engagement_dashboard::timeline::SeriesKind;

#[derive(Parser)]
#[command(name = "engagement-dashboard")]
#[command(
    about = "Project and client call-metric analytics over uploaded CSV files",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Field delimiter of the input file (`,`, `;`, `|`, `\t`)
    #[arg(long, global = true, default_value = ",")]
    delimiter: String,
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
    /// Write the result here instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project dashboard views for the current filters
    Projects {
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        filter: ProjectFilterArgs,
        /// Timeline series: completed, indexed, presented, events, projects
        #[arg(long, default_value = "completed")]
        series: SeriesKind,
        /// Column to order the record list by
        #[arg(long, default_value = "Project Name")]
        sort: ProjectField,
        #[arg(long)]
        desc: bool,
    },
    /// Client metrics dashboard views
    Clients {
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        filter: ClientFilterArgs,
        #[arg(long, value_enum, default_value_t = ClientSortArg::Name)]
        sort: ClientSortArg,
        #[arg(long)]
        desc: bool,
    },
    /// Compare two conditions loaded from JSON files
    Compare {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        first: PathBuf,
        #[arg(long)]
        second: PathBuf,
    },
    /// Compare every manager or every associate side by side
    CompareAll {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum)]
        by: GroupArg,
        #[arg(long, value_enum, default_value_t = GroupSortArg::Total)]
        sort: GroupSortArg,
        #[arg(long)]
        asc: bool,
    },
    /// List project filter options
    Options {
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        filter: ProjectFilterArgs,
    },
}

#[derive(Args)]
struct ProjectFilterArgs {
    #[arg(long)]
    project_type: Option<String>,
    #[arg(long)]
    manager: Option<String>,
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    geoscope: Option<String>,
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    event_type: Option<String>,
    #[arg(long)]
    associate: Option<String>,
    #[arg(long)]
    terms_state: Option<String>,
    /// Earliest Project Start Date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Latest Project Start Date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl From<ProjectFilterArgs> for ProjectFilter {
    fn from(args: ProjectFilterArgs) -> Self {
        ProjectFilter {
            project_type: args.project_type,
            project_manager: args.manager,
            client_name: args.client,
            geoscope: args.geoscope,
            industry: args.industry,
            event_type: args.event_type,
            event_executor_associate: args.associate,
            expert_terms_state: args.terms_state,
            date_range: DateRange {
                start: args.start,
                end: args.end,
            },
        }
    }
}

#[derive(Args)]
struct ClientFilterArgs {
    /// Case-insensitive client name search
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    min_rate: Option<f64>,
    #[arg(long)]
    max_rate: Option<f64>,
    #[arg(long)]
    min_reticula: Option<i64>,
    #[arg(long)]
    max_reticula: Option<i64>,
    #[arg(long)]
    min_expected: Option<i64>,
    #[arg(long)]
    max_expected: Option<i64>,
    #[arg(long)]
    min_completed: Option<i64>,
    #[arg(long)]
    max_completed: Option<i64>,
}

impl From<ClientFilterArgs> for ClientMetricFilter {
    fn from(args: ClientFilterArgs) -> Self {
        ClientMetricFilter {
            client_name: args.client,
            min_rate: args.min_rate,
            max_rate: args.max_rate,
            min_reticula_calls: args.min_reticula,
            max_reticula_calls: args.max_reticula,
            min_inex_one_expected: args.min_expected,
            max_inex_one_expected: args.max_expected,
            min_inex_one_completed: args.min_completed,
            max_inex_one_completed: args.max_completed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ClientSortArg {
    Name,
    Rate,
    Reticula,
    Expected,
    Completed,
}

impl From<ClientSortArg> for ClientMetricField {
    fn from(arg: ClientSortArg) -> Self {
        match arg {
            ClientSortArg::Name => ClientMetricField::ClientName,
            ClientSortArg::Rate => ClientMetricField::Rate,
            ClientSortArg::Reticula => ClientMetricField::ReticulaCompleted,
            ClientSortArg::Expected => ClientMetricField::InexOneExpected,
            ClientSortArg::Completed => ClientMetricField::InexOneCompleted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupArg {
    Managers,
    Associates,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupSortArg {
    Name,
    Total,
    Clients,
    Experts,
    Completed,
    Rate,
}

impl From<GroupSortArg> for GroupSortField {
    fn from(arg: GroupSortArg) -> Self {
        match arg {
            GroupSortArg::Name => GroupSortField::Name,
            GroupSortArg::Total => GroupSortField::Kpi(GroupKpi::TotalProjects),
            GroupSortArg::Clients => GroupSortField::Kpi(GroupKpi::UniqueClients),
            GroupSortArg::Experts => GroupSortField::Kpi(GroupKpi::UniqueExperts),
            GroupSortArg::Completed => GroupSortField::Kpi(GroupKpi::CompletedProjects),
            GroupSortArg::Rate => GroupSortField::Kpi(GroupKpi::CompletedRate),
        }
    }
}

fn direction(descending: bool) -> SortDirection {
    if descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_projects(csv: &Path, options: &IngestOptions) -> anyhow::Result<ProjectDashboard> {
    let input = ingest::read_input(csv)?;
    let records = ingest::ingest_projects(&input, options)
        .with_context(|| format!("failed to load project data from {}", csv.display()))?;
    Ok(ProjectDashboard::new(records))
}

fn render<T: Serialize>(
    format: OutputFormat,
    value: &T,
    markdown: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Markdown => Ok(markdown(value)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("failed to serialize derived views")
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    let options = config::ingest_options(&cli.delimiter)?;

    let rendered = match cli.command {
        Commands::Projects {
            csv,
            filter,
            series,
            sort,
            desc,
        } => {
            let dashboard = load_projects(&csv, &options)?
                .with_filter(filter.into())
                .with_sort(ProjectSort::new(sort, direction(desc)))
                .with_series(series);
            render(cli.format, &dashboard.derive(), report::build_project_report)?
        }
        Commands::Clients {
            csv,
            filter,
            sort,
            desc,
        } => {
            let input = ingest::read_input(&csv)?;
            let records = ingest::ingest_client_metrics(&input, &options).with_context(|| {
                format!("failed to load client metrics from {}", csv.display())
            })?;
            let dashboard = ClientMetricsDashboard::new(records)
                .with_filter(filter.into())
                .with_sort(ClientMetricSort::new(sort.into(), direction(desc)));
            render(
                cli.format,
                &dashboard.derive(),
                report::build_client_metrics_report,
            )?
        }
        Commands::Compare { csv, first, second } => {
            let first = config::load_condition(&first)?;
            let second = config::load_condition(&second)?;
            let dashboard = load_projects(&csv, &options)?;
            render(
                cli.format,
                &dashboard.compare(&first, &second),
                report::build_comparison_report,
            )?
        }
        Commands::CompareAll { csv, by, sort, asc } => {
            let group_by = match by {
                GroupArg::Managers => GroupBy::Managers,
                GroupArg::Associates => GroupBy::Associates,
            };
            let sort = GroupSort::new(sort.into(), direction(!asc));
            let dashboard = load_projects(&csv, &options)?;
            render(
                cli.format,
                &dashboard.compare_groups(group_by, sort),
                report::build_grouped_report,
            )?
        }
        Commands::Options { csv, filter } => {
            let dashboard = load_projects(&csv, &options)?.with_filter(filter.into());
            render(
                cli.format,
                &dashboard.derive().options,
                report::build_options_report,
            )?
        }
    };

    match cli.out {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "report written");
            println!("Report written to {}.", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
