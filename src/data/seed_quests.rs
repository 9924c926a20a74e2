use chrono::{DateTime, Utc};

use crate::catalog::QuestRecord;
use crate::content::{ActionKind, Difficulty, Prize, QuestDefinition, QuestId, Step};

pub const SYSTEM_CREATOR_ID: &str = "system";
pub const SYSTEM_CREATOR_NAME: &str = "Quest Team";

fn seeded_at(unix_seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(unix_seconds, 0).unwrap_or_default()
}

/// Quests every fresh install starts with.
pub fn seed_quests() -> Vec<QuestRecord> {
    vec![
        QuestRecord {
            definition: QuestDefinition {
                id: QuestId::from("first-swap"),
                title: "Your First Token Swap".to_string(),
                description: "Learn how to swap tokens on a decentralized exchange".to_string(),
                category: "DeFi Fundamentals".to_string(),
                creator_id: SYSTEM_CREATOR_ID.to_string(),
                creator_name: SYSTEM_CREATOR_NAME.to_string(),
                xp: 50,
                duration: "5 min".to_string(),
                difficulty: Difficulty::Beginner,
                steps: vec![
                    Step::Learn {
                        title: "What is a DEX?".to_string(),
                        content: "A Decentralized Exchange (DEX) is a peer-to-peer marketplace where cryptocurrency traders make transactions directly without intermediaries.".to_string(),
                    },
                    Step::Action {
                        title: "Connect Your Wallet".to_string(),
                        content: "To interact with a DEX, you need to connect your crypto wallet.".to_string(),
                        action: ActionKind::ConnectWallet,
                    },
                    Step::Action {
                        title: "Execute the Swap".to_string(),
                        content: "Click 'Swap' and confirm the transaction in your wallet.".to_string(),
                        action: ActionKind::SimulateSwap,
                    },
                ],
                prize: Some(Prize::SoulboundToken {
                    name: "DeFi Pioneer".to_string(),
                    description: "Soulbound token proving you completed your first swap".to_string(),
                    image_url: Some("/sbt-defi-pioneer.png".to_string()),
                    contract_address: None,
                }),
                is_published: true,
                created_at: seeded_at(1_704_067_200),
            },
            completions: 1247,
            rating: 4.8,
        },
        QuestRecord {
            definition: QuestDefinition {
                id: QuestId::from("wallet-security"),
                title: "Wallet Security Basics".to_string(),
                description: "Learn essential practices to keep your crypto assets safe".to_string(),
                category: "Security".to_string(),
                creator_id: SYSTEM_CREATOR_ID.to_string(),
                creator_name: SYSTEM_CREATOR_NAME.to_string(),
                xp: 75,
                duration: "8 min".to_string(),
                difficulty: Difficulty::Beginner,
                steps: vec![
                    Step::Learn {
                        title: "Seed Phrase Security".to_string(),
                        content: "Your seed phrase is the master key to your wallet. Never share it online.".to_string(),
                    },
                    Step::Quiz {
                        title: "Security Quiz".to_string(),
                        content: "Test your knowledge about wallet security.".to_string(),
                        question: "What should you do if someone asks for your seed phrase?".to_string(),
                        options: vec![
                            "Share it if they seem trustworthy".to_string(),
                            "Never share it with anyone".to_string(),
                            "Only share the first few words".to_string(),
                        ],
                        correct: 1,
                    },
                ],
                prize: Some(Prize::Nft {
                    name: "Security Guardian".to_string(),
                    description: "NFT certificate for mastering wallet security".to_string(),
                    image_url: Some("/nft-security-guardian.png".to_string()),
                    contract_address: None,
                }),
                is_published: true,
                created_at: seeded_at(1_704_153_600),
            },
            completions: 892,
            rating: 4.9,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::validate_unique_ids;

    #[test]
    fn seeded_quests_are_valid() {
        let seeds = seed_quests();
        assert_eq!(seeds.len(), 2);
        validate_unique_ids(seeds.iter().map(|record| &record.definition))
            .expect("seed quests validate");
    }
}
