use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use gym_admin::display::{duration_label, format_date, or_dash, plan_option_label, rupees};
use gym_admin::forms::{AdminForms, BillForm, MemberForm, MemberViews, TrainerForm};
use gym_admin::membership::status_at;
use gym_admin::models::{BillView, Trainer};
use gym_admin::{ClientConfig, GymApi, HttpGymApi, RenewalController};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "gymctl")]
#[command(about = "Operator console for the gym admin service")]
struct Cli {
    /// Service base URL (defaults to GYM_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Expiring-soon window in days (defaults to GYM_LOOKAHEAD_DAYS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    days: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List membership plans
    Plans,
    /// List members with their membership status
    Members {
        /// Evaluate status as of this date instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List memberships ending inside the expiring-soon window
    Expiring,
    /// Extend a membership by one plan duration
    Renew {
        member_id: u64,
        /// Renew without recording a payment
        #[arg(long)]
        no_bill: bool,
    },
    /// Add a member
    AddMember {
        #[arg(long)]
        name: String,
        #[arg(long)]
        join_date: String,
        #[arg(long)]
        plan: String,
    },
    /// Edit a member; the end date is recomputed
    EditMember {
        member_id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        join_date: String,
        #[arg(long)]
        plan: String,
    },
    /// Remove a member
    RemoveMember { member_id: u64 },
    /// List trainers
    Trainers,
    /// Add a trainer
    AddTrainer {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        specialization: String,
        #[arg(long)]
        salary: Option<i64>,
    },
    /// Remove a trainer
    RemoveTrainer { trainer_id: u64 },
    /// List billing records
    Billing,
    /// Record a payment for a member, looked up by name
    Bill {
        #[arg(long)]
        member_name: String,
        #[arg(long)]
        date: String,
        /// Bill the price of this plan when no amount is given
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        amount: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(days) = cli.days {
        config.lookahead_days = days;
    }
    let api = Arc::new(HttpGymApi::new(&config)?);

    match cli.command {
        Command::Plans => {
            let forms = AdminForms::open(Arc::clone(&api), config.lookahead_days).await?;
            println!("{:<18} {:<44} {:<10} {:>8}", "CODE", "PLAN", "DURATION", "PRICE");
            for plan in forms.plans().table_order() {
                println!(
                    "{:<18} {:<44} {:<10} {:>8}",
                    plan.code,
                    plan_option_label(&plan),
                    duration_label(plan.duration_months),
                    plan.price
                );
            }
        }
        Command::Members { today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let views = MemberViews {
                members: api.members().await?,
                expiring: api.expiring(config.lookahead_days).await?,
            };
            print_members(&views, Some((today, config.lookahead_days)));
        }
        Command::Expiring => {
            let controller = RenewalController::new(Arc::clone(&api), config.lookahead_days)?;
            let entries = controller.expiring().await?;
            println!("{:>5}  {:<24} {:<12} STATUS", "ID", "NAME", "END DATE");
            for entry in entries {
                println!(
                    "{:>5}  {:<24} {:<12} Pending Payment",
                    entry.id,
                    entry.name,
                    format_date(Some(entry.end_date))
                );
            }
        }
        Command::Renew { member_id, no_bill } => {
            let controller = RenewalController::new(Arc::clone(&api), config.lookahead_days)?;
            let receipt = controller.renew(member_id, !no_bill).await?;
            println!(
                "Renewed. New end date: {}",
                format_date(Some(receipt.new_end_date))
            );
            println!("{} still expiring soon", receipt.views.expiring.len());
        }
        Command::AddMember {
            name,
            join_date,
            plan,
        } => {
            let forms = AdminForms::open(Arc::clone(&api), config.lookahead_days).await?;
            let form = MemberForm {
                name,
                join_date,
                plan_code: plan,
            };
            let outcome = forms.add_member(&form).await?;
            println!("{}", outcome.notice);
            print_members(&outcome.views, None);
        }
        Command::EditMember {
            member_id,
            name,
            join_date,
            plan,
        } => {
            let forms = AdminForms::open(Arc::clone(&api), config.lookahead_days).await?;
            let form = MemberForm {
                name,
                join_date,
                plan_code: plan,
            };
            let outcome = forms.edit_member(member_id, &form).await?;
            println!("{}", outcome.notice);
            print_members(&outcome.views, None);
        }
        Command::RemoveMember { member_id } => {
            let forms = AdminForms::open(Arc::clone(&api), config.lookahead_days).await?;
            let outcome = forms.remove_member(member_id).await?;
            println!("{}", outcome.notice);
            print_members(&outcome.views, None);
        }
        Command::Trainers => {
            print_trainers(&api.trainers().await?);
        }
        Command::AddTrainer {
            name,
            specialization,
            salary,
        } => {
            let forms = AdminForms::open(Arc::clone(&api), config.lookahead_days).await?;
            let form = TrainerForm {
                name,
                specialization,
                salary,
            };
            let outcome = forms.add_trainer(&form).await?;
            println!("{}", outcome.notice);
            print_trainers(&outcome.views);
        }
        Command::RemoveTrainer { trainer_id } => {
            let forms = AdminForms::open(Arc::clone(&api), config.lookahead_days).await?;
            let outcome = forms.remove_trainer(trainer_id).await?;
            println!("{}", outcome.notice);
            print_trainers(&outcome.views);
        }
        Command::Billing => {
            print_bills(&api.bills().await?);
        }
        Command::Bill {
            member_name,
            date,
            plan,
            amount,
        } => {
            let forms = AdminForms::open(Arc::clone(&api), config.lookahead_days).await?;
            let form = BillForm {
                member_name,
                date_paid: date,
                plan_code: plan,
                amount,
            };
            let outcome = forms.generate_bill(&form).await?;
            println!("{}", outcome.notice);
            print_bills(&outcome.views);
        }
    }

    Ok(())
}

fn print_members(views: &MemberViews, status: Option<(NaiveDate, u32)>) {
    println!(
        "{:>5}  {:<24} {:<44} {:<12} {:<12} STATUS",
        "ID", "NAME", "PLAN", "JOINED", "ENDS"
    );
    for member in &views.members {
        let label = match status {
            Some((today, days)) => status_at(today, member.end_date, days).label(),
            None => "",
        };
        println!(
            "{:>5}  {:<24} {:<44} {:<12} {:<12} {label}",
            member.id,
            member.name,
            member.plan_label,
            format_date(Some(member.join_date)),
            format_date(Some(member.end_date))
        );
    }
    println!("{} expiring soon", views.expiring.len());
}

fn print_trainers(trainers: &[Trainer]) {
    println!("{:>5}  {:<24} {:<24} {:>10}", "ID", "NAME", "SPECIALIZATION", "SALARY");
    for trainer in trainers {
        println!(
            "{:>5}  {:<24} {:<24} {:>10}",
            trainer.id,
            trainer.name,
            or_dash(&trainer.specialization),
            rupees(trainer.salary)
        );
    }
}

fn print_bills(bills: &[BillView]) {
    println!("{:>5}  {:<24} {:>10} {:<12}", "ID", "MEMBER", "AMOUNT", "DATE PAID");
    for bill in bills {
        println!(
            "{:>5}  {:<24} {:>10} {:<12}",
            bill.id,
            bill.member_name,
            rupees(bill.amount),
            format_date(Some(bill.date_paid))
        );
    }
}
