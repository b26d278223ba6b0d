//! Retirement Planner CLI
//!
//! Runs a single calculator, a JSON batch, a rate sweep, or an access check

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use retirement_planner::access::{AccessPolicy, Principal, Role};
use retirement_planner::projection::{
    EpfInput, HlvInput, PpfInput, Projection, RetirementInput, SipInput, SwpInput,
};
use retirement_planner::scenario::{rate_sweep, run_batch, BatchOutcome};
use retirement_planner::{CalculatorRequest, CalculatorResponse};

#[derive(Parser, Debug)]
#[command(name = "retirement_planner", version, about = "Retirement planning calculators")]
struct Cli {
    /// Print the full result as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Write the year-by-year series to this CSV file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Employees' Provident Fund corpus
    Epf(EpfArgs),
    /// Public Provident Fund maturity
    Ppf(PpfArgs),
    /// Systematic Investment Plan growth
    Sip(SipArgs),
    /// Systematic Withdrawal Plan drawdown
    Swp(SwpArgs),
    /// Human Life Value
    Hlv(HlvArgs),
    /// Retirement corpus and required SIP
    Retirement(RetirementArgs),
    /// Run a JSON array of calculator requests
    Batch {
        #[arg(long)]
        input: PathBuf,
    },
    /// Run one calculator (with defaults) across several rates
    Sweep {
        /// epf, ppf, sip, swp, hlv or retirement
        #[arg(long)]
        instrument: String,

        /// Comma-separated rates in % p.a.
        #[arg(long, value_delimiter = ',', required = true)]
        rates: Vec<f64>,
    },
    /// Show the access decision for a path
    Access {
        #[arg(long)]
        path: String,

        /// Role of the signed-in user; omit for an anonymous request
        #[arg(long)]
        role: Option<Role>,
    },
}

#[derive(Args, Debug)]
struct EpfArgs {
    #[arg(long)]
    basic_salary: Option<f64>,
    #[arg(long)]
    employee_pct: Option<f64>,
    #[arg(long)]
    employer_pct: Option<f64>,
    #[arg(long)]
    rate: Option<f64>,
    #[arg(long)]
    years: Option<u32>,
}

#[derive(Args, Debug)]
struct PpfArgs {
    #[arg(long)]
    annual_investment: Option<f64>,
    #[arg(long)]
    rate: Option<f64>,
    #[arg(long)]
    years: Option<u32>,
}

#[derive(Args, Debug)]
struct SipArgs {
    #[arg(long)]
    monthly_investment: Option<f64>,
    #[arg(long)]
    rate: Option<f64>,
    #[arg(long)]
    years: Option<u32>,
}

#[derive(Args, Debug)]
struct SwpArgs {
    #[arg(long)]
    initial_investment: Option<f64>,
    #[arg(long)]
    monthly_withdrawal: Option<f64>,
    #[arg(long)]
    rate: Option<f64>,
    #[arg(long)]
    years: Option<u32>,
}

#[derive(Args, Debug)]
struct HlvArgs {
    #[arg(long)]
    current_age: Option<u32>,
    #[arg(long)]
    retirement_age: Option<u32>,
    #[arg(long)]
    annual_income: Option<f64>,
    #[arg(long)]
    growth: Option<f64>,
    #[arg(long)]
    discount: Option<f64>,
}

#[derive(Args, Debug)]
struct RetirementArgs {
    #[arg(long)]
    current_age: Option<u32>,
    #[arg(long)]
    retirement_age: Option<u32>,
    #[arg(long)]
    life_expectancy: Option<u32>,
    #[arg(long)]
    monthly_expenses: Option<f64>,
    #[arg(long)]
    inflation: Option<f64>,
    #[arg(long)]
    pre_return: Option<f64>,
    #[arg(long)]
    post_return: Option<f64>,
    #[arg(long)]
    savings: Option<f64>,
}

impl From<EpfArgs> for EpfInput {
    fn from(a: EpfArgs) -> Self {
        let d = EpfInput::default();
        Self {
            basic_salary: a.basic_salary.unwrap_or(d.basic_salary),
            employee_pct: a.employee_pct.unwrap_or(d.employee_pct),
            employer_pct: a.employer_pct.unwrap_or(d.employer_pct),
            rate_pct: a.rate.unwrap_or(d.rate_pct),
            years: a.years.unwrap_or(d.years),
        }
    }
}

impl From<PpfArgs> for PpfInput {
    fn from(a: PpfArgs) -> Self {
        let d = PpfInput::default();
        Self {
            annual_investment: a.annual_investment.unwrap_or(d.annual_investment),
            rate_pct: a.rate.unwrap_or(d.rate_pct),
            years: a.years.unwrap_or(d.years),
        }
    }
}

impl From<SipArgs> for SipInput {
    fn from(a: SipArgs) -> Self {
        let d = SipInput::default();
        Self {
            monthly_investment: a.monthly_investment.unwrap_or(d.monthly_investment),
            rate_pct: a.rate.unwrap_or(d.rate_pct),
            years: a.years.unwrap_or(d.years),
        }
    }
}

impl From<SwpArgs> for SwpInput {
    fn from(a: SwpArgs) -> Self {
        let d = SwpInput::default();
        Self {
            initial_investment: a.initial_investment.unwrap_or(d.initial_investment),
            monthly_withdrawal: a.monthly_withdrawal.unwrap_or(d.monthly_withdrawal),
            rate_pct: a.rate.unwrap_or(d.rate_pct),
            years: a.years.unwrap_or(d.years),
        }
    }
}

impl From<HlvArgs> for HlvInput {
    fn from(a: HlvArgs) -> Self {
        let d = HlvInput::default();
        Self {
            current_age: a.current_age.unwrap_or(d.current_age),
            retirement_age: a.retirement_age.unwrap_or(d.retirement_age),
            annual_income: a.annual_income.unwrap_or(d.annual_income),
            growth_pct: a.growth.unwrap_or(d.growth_pct),
            discount_pct: a.discount.unwrap_or(d.discount_pct),
        }
    }
}

impl From<RetirementArgs> for RetirementInput {
    fn from(a: RetirementArgs) -> Self {
        let d = RetirementInput::default();
        Self {
            current_age: a.current_age.unwrap_or(d.current_age),
            retirement_age: a.retirement_age.unwrap_or(d.retirement_age),
            life_expectancy: a.life_expectancy.unwrap_or(d.life_expectancy),
            monthly_expenses: a.monthly_expenses.unwrap_or(d.monthly_expenses),
            inflation_pct: a.inflation.unwrap_or(d.inflation_pct),
            pre_retirement_return_pct: a.pre_return.unwrap_or(d.pre_retirement_return_pct),
            post_retirement_return_pct: a.post_return.unwrap_or(d.post_retirement_return_pct),
            current_savings: a.savings.unwrap_or(d.current_savings),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let request = match cli.command {
        Command::Epf(args) => CalculatorRequest::Epf(args.into()),
        Command::Ppf(args) => CalculatorRequest::Ppf(args.into()),
        Command::Sip(args) => CalculatorRequest::Sip(args.into()),
        Command::Swp(args) => CalculatorRequest::Swp(args.into()),
        Command::Hlv(args) => CalculatorRequest::Hlv(args.into()),
        Command::Retirement(args) => CalculatorRequest::Retirement(args.into()),
        Command::Batch { input } => return batch(&input),
        Command::Sweep { instrument, rates } => return sweep(&instrument, &rates),
        Command::Access { path, role } => {
            access(&path, role);
            return Ok(());
        }
    };

    let response = request
        .run()
        .with_context(|| format!("{} projection failed", request.instrument()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_summary(&response);
        print_series(response.projection());
    }

    if let Some(path) = cli.csv {
        write_series_csv(&path, response.projection())?;
        println!("\nSeries written to: {}", path.display());
    }

    Ok(())
}

fn batch(input: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let requests: Vec<CalculatorRequest> = serde_json::from_str(&raw).context("parsing batch requests")?;

    let outcomes: Vec<BatchOutcome> = run_batch(&requests).into_iter().map(BatchOutcome::from).collect();
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}

fn sweep(instrument: &str, rates: &[f64]) -> anyhow::Result<()> {
    let request: CalculatorRequest = serde_json::from_value(serde_json::json!({ "instrument": instrument }))
        .with_context(|| format!("unknown instrument `{}`", instrument))?;
    if rates.is_empty() {
        bail!("no rates given");
    }

    println!("{:>8} {:>6} {:>18} {:>18}", "Rate%", "Years", "Contributed", "Final");
    println!("{}", "-".repeat(54));
    for (rate, result) in rate_sweep(&request, rates) {
        match result {
            Ok(response) => {
                let p = response.projection();
                println!("{:>8.2} {:>6} {:>18.2} {:>18.2}", rate, p.periods(), p.total_contributed, p.final_value);
            }
            Err(e) => println!("{:>8.2} error: {}", rate, e),
        }
    }
    Ok(())
}

fn access(path: &str, role: Option<Role>) {
    let policy = AccessPolicy::default();
    let principal = role.map(|role| Principal::new("cli", "cli@localhost", role));
    let decision = policy.decide(path, principal.as_ref());

    println!("Path:     {}", path);
    println!("Class:    {:?}", policy.classify(path));
    println!("Role:     {}", role.map_or("anonymous", |r| r.as_str()));
    println!("Decision: {:?}", decision);
    if let Some(target) = decision.redirect_target(&policy) {
        println!("Redirect: {}", target);
    }
}

fn print_summary(response: &CalculatorResponse) {
    println!("Retirement Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    match response {
        CalculatorResponse::Epf(r) => {
            println!("EPF");
            println!("  Total Contribution: {:.2}", r.projection.total_contributed);
            println!("  Interest Earned:    {:.2}", r.interest_earned);
            println!("  Maturity Amount:    {:.2}", r.maturity_amount);
        }
        CalculatorResponse::Ppf(r) => {
            println!("PPF");
            println!("  Total Investment: {:.2}", r.total_investment);
            println!("  Maturity Value:   {:.2}", r.maturity_amount);
        }
        CalculatorResponse::Sip(r) => {
            println!("SIP");
            println!("  Invested:          {:.2}", r.invested);
            println!("  Estimated Returns: {:.2}", r.estimated_returns);
            println!("  Maturity Amount:   {:.2}", r.maturity_amount);
        }
        CalculatorResponse::Swp(r) => {
            println!("SWP");
            println!("  Total Withdrawn: {:.2}", r.total_withdrawn);
            println!("  Final Value:     {:.2}", r.projection.final_value);
            if r.depleted() {
                println!("  Corpus exhausted in year {}", r.projection.periods());
            }
        }
        CalculatorResponse::Hlv(r) => {
            println!("HLV");
            println!("  Total Future Income: {:.2}", r.total_income);
            println!("  Human Life Value:    {:.2}", r.total_hlv);
        }
        CalculatorResponse::Retirement(r) => {
            println!("Retirement");
            println!("  Years to Retirement:      {}", r.years_to_retirement);
            println!("  Monthly Expense Then:     {:.2}", r.monthly_expense_at_retirement);
            println!("  Corpus Required:          {:.2}", r.corpus_required);
            println!("  Savings at Retirement:    {:.2}", r.savings_at_retirement);
            println!("  Shortfall:                {:.2}", r.shortfall);
            println!("  Monthly SIP Required:     {:.2}", r.monthly_sip_required);
        }
    }
    println!();
}

fn print_series(projection: &Projection) {
    println!("{:>6} {:>18} {:>18}", "Year", "Balance", "Delta");
    println!("{}", "-".repeat(44));
    for point in &projection.series {
        println!("{:>6} {:>18.2} {:>18.2}", point.period, point.balance, point.delta);
    }
}

fn write_series_csv(path: &Path, projection: &Projection) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for point in &projection.series {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["retirement_planner", "swp", "--monthly-withdrawal", "25000", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Swp(args) => {
                let input: SwpInput = args.into();
                assert_eq!(input.monthly_withdrawal, 25_000.0);
                assert_eq!(input.years, 20);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_access_role_parses() {
        let cli = Cli::try_parse_from(["retirement_planner", "access", "--path", "/admin", "--role", "admin"]).unwrap();
        assert!(matches!(cli.command, Command::Access { role: Some(Role::Admin), .. }));
        assert!(Cli::try_parse_from(["retirement_planner", "access", "--path", "/", "--role", "root"]).is_err());
    }

    #[test]
    fn test_sweep_rates_split() {
        let cli = Cli::try_parse_from(["retirement_planner", "sweep", "--instrument", "ppf", "--rates", "6,7.1,8"]).unwrap();
        match cli.command {
            Command::Sweep { rates, .. } => assert_eq!(rates, vec![6.0, 7.1, 8.0]),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
