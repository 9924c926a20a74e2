use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::error;

use questline::admin::{AdminQuestForm, AdminQuestService, RewardType};
use questline::config::AppConfig;
use questline::content::QuestId;
use questline::core::world::{QuestApp, QuestIntent};
use questline::error::QuestError;
use questline::logging::init_logging;
use questline::rules::ClaimPolicy;
use questline::ui::dashboard::{render_quest_list, render_snapshot, render_status};

#[derive(Parser)]
#[command(name = "questline")]
#[command(about = "Quest progression and rewards (debug driver)", long_about = None)]
struct Cli {
    /// SQLite file holding the user and quest-list snapshots.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[arg(long, value_name = "once|repeatable")]
    claim_policy: Option<ClaimPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Status,
    Quests,
    Connect,
    Verify,
    /// Open a quest and step through it, answering quizzes in order.
    Play {
        quest: String,

        #[arg(long = "answer")]
        answers: Vec<usize>,
    },
    Claim {
        quest: String,
    },
    Mint {
        quest: String,
    },
    /// Exercise the admin CRUD surface against an in-memory store.
    AdminDemo,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            process::exit(2);
        }
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(policy) = cli.claim_policy {
        config.claim_policy = policy;
    }
    init_logging(&config.log_filter);

    if let Commands::AdminDemo = cli.command {
        admin_demo();
        return;
    }

    let mut app = match QuestApp::open(&config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Failed to open {}: {}", config.db_path.display(), err);
            process::exit(1);
        }
    };

    if let Err(err) = run(&mut app, cli.command) {
        error!(error = %err, "command failed");
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(app: &mut QuestApp, command: Commands) -> Result<(), QuestError> {
    match command {
        Commands::Status => print!("{}", render_status(app.catalog(), app.profile())),
        Commands::Quests => print!("{}", render_quest_list(app.catalog(), app.profile())),
        Commands::Connect => print!("{}", render_snapshot(&app.dispatch(QuestIntent::Connect)?)),
        Commands::Verify => print!(
            "{}",
            render_snapshot(&app.dispatch(QuestIntent::VerifyIdentity)?)
        ),
        Commands::Play { quest, answers } => play(app, QuestId::new(quest), answers)?,
        Commands::Claim { quest } => print!(
            "{}",
            render_snapshot(&app.dispatch(QuestIntent::ClaimPrize {
                quest_id: QuestId::new(quest),
            })?)
        ),
        Commands::Mint { quest } => print!(
            "{}",
            render_snapshot(&app.dispatch(QuestIntent::MintCredential {
                quest_id: QuestId::new(quest),
            })?)
        ),
        Commands::AdminDemo => admin_demo(),
    }
    Ok(())
}

fn play(app: &mut QuestApp, quest_id: QuestId, answers: Vec<usize>) -> Result<(), QuestError> {
    let snapshot = app.dispatch(QuestIntent::OpenQuest {
        quest_id: quest_id.clone(),
    })?;
    print!("{}", render_snapshot(&snapshot));

    let mut answers = answers.into_iter();
    loop {
        let Some(session) = app.session(&quest_id) else {
            break;
        };
        let Some(index) = session.step_index() else {
            break;
        };
        let is_quiz = app
            .catalog()
            .require(&quest_id)?
            .step(index)
            .is_some_and(|step| step.is_quiz());

        let intent = if is_quiz {
            let Some(selected) = answers.next() else {
                println!("Step {} is a quiz; pass --answer to continue.", index + 1);
                break;
            };
            QuestIntent::SubmitAnswer {
                quest_id: quest_id.clone(),
                selected,
            }
        } else {
            QuestIntent::Advance {
                quest_id: quest_id.clone(),
            }
        };
        print!("{}", render_snapshot(&app.dispatch(intent)?));
    }
    Ok(())
}

fn admin_demo() {
    println!("=== Admin Quests (in-memory) ===");
    let service = AdminQuestService::in_memory();
    let response = service.create(AdminQuestForm {
        title: "Liquidity Pools".to_string(),
        description: "Provide liquidity and earn fees".to_string(),
        reward_type: Some(RewardType::Erc20),
        reward_amount: "50".to_string(),
        is_published: true,
    });
    println!("create: {}", response.message);
    println!("create (empty): {}", service.create(AdminQuestForm::default()).message);

    let quests = match service.list() {
        Ok(quests) => quests,
        Err(err) => {
            eprintln!("Failed to list admin quests: {}", err);
            return;
        }
    };
    for quest in &quests {
        println!(
            "  {} {} [{} {}] published={}",
            quest.id, quest.title, quest.reward_amount, quest.reward_type, quest.is_published
        );
    }
    if let Some(first) = quests.first() {
        let edit = AdminQuestForm {
            title: format!("{} (updated)", first.title),
            description: first.description.clone(),
            reward_type: Some(RewardType::Nft),
            reward_amount: "1".to_string(),
            is_published: false,
        };
        println!("update: {}", service.update(&first.id, edit).message);
        println!("delete: {}", service.delete(&first.id).message);
    }
    println!("delete (missing): {}", service.delete("quest-0").message);
}
