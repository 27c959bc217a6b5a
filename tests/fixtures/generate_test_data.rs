// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成一套可直接运行的会议实例
// 输出: tests/fixtures/datasets/{instance,catalog,run_config}.json
// 规模: 2 sessions × 4 tracks, 32 篇论文 (capacity 4 恰好排满)
// 用法: cargo run --bin generate_test_data [seed]
// ==========================================

use conference_scheduler::config::{ModelParameters, OutputConfig, RunConfig, SolverConfig};
use conference_scheduler::domain::catalog::PaperCatalog;
use conference_scheduler::domain::instance::InstanceData;
use conference_scheduler::domain::types::{
    AuthorId, BidderId, PaperId, SessionId, TopicId, TrackId,
};
use conference_scheduler::importer::InstanceLoader;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::path::{Path, PathBuf};

const OUTPUT_DIR: &str = "tests/fixtures/datasets";
const DEFAULT_SEED: u64 = 2022;

const SESSIONS: u32 = 2;
const TRACKS: u32 = 4;
const PAPERS: u32 = 32;
const BIDDERS: u32 = 20;
const AUTHORS: u32 = 20;
const TOPICS: u32 = 10;

// (session, paper) 时间冲突
const CONFLICTS: &[(u32, u32)] = &[(1, 10), (2, 20)];

fn main() -> Result<(), Box<dyn Error>> {
    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(DEFAULT_SEED);
    println!("开始生成测试数据集 (seed={})...", seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let instance = generate_instance(&mut rng);
    instance.validate()?;
    let catalog = generate_catalog(&instance);

    let dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(dir)?;

    let loader = InstanceLoader::new();
    loader.save_instance(&instance, &dir.join("instance.json"))?;
    println!(
        "✓ 生成 instance.json ({} 篇论文, {} 条投标, {} 条作者关系)",
        instance.paper_ids.len(),
        instance.preferences.len(),
        instance.authorship.len()
    );

    loader.save_catalog(&catalog, &dir.join("catalog.json"))?;
    println!("✓ 生成 catalog.json ({} 条)", catalog.len());

    let config = RunConfig {
        instance_path: PathBuf::from("instance.json"),
        catalog_path: PathBuf::from("catalog.json"),
        model: ModelParameters::default(),
        solver: SolverConfig::default(),
        output: OutputConfig {
            save_results: true,
            ..Default::default()
        },
    };
    std::fs::write(
        dir.join("run_config.json"),
        serde_json::to_string_pretty(&config)?,
    )?;
    println!("✓ 生成 run_config.json");

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}

fn generate_instance(rng: &mut StdRng) -> InstanceData {
    let paper_ids: Vec<PaperId> = (1..=PAPERS).map(PaperId).collect();
    let author_ids: Vec<AuthorId> = (1..=AUTHORS).map(AuthorId).collect();
    let topic_ids: Vec<TopicId> = (1..=TOPICS).map(TopicId).collect();

    let mut instance = InstanceData {
        session_ids: (1..=SESSIONS).map(SessionId).collect(),
        track_ids: (1..=TRACKS).map(TrackId).collect(),
        paper_ids: paper_ids.clone(),
        bidder_ids: (1..=BIDDERS).map(BidderId).collect(),
        author_ids: author_ids.clone(),
        topic_ids: topic_ids.clone(),
        ..Default::default()
    };

    // 每位投标者 1-3 篇, 效用 [0, 100)
    for b in 1..=BIDDERS {
        let count = rng.gen_range(1..=3);
        for &p in paper_ids.choose_multiple(rng, count) {
            let utility = (rng.gen_range(0.0..100.0_f64) * 100.0).round() / 100.0;
            instance.preferences.insert((BidderId(b), p), utility);
        }
    }

    // 每篇论文 1-2 位作者, 1-3 个主题
    for &p in &paper_ids {
        let count = rng.gen_range(1..=2);
        for &a in author_ids.choose_multiple(rng, count) {
            instance.authorship.insert((a, p));
        }
        let count = rng.gen_range(1..=3);
        for &t in topic_ids.choose_multiple(rng, count) {
            instance.paper_topics.insert((p, t));
        }
    }

    for &(j, p) in CONFLICTS {
        instance.conflicts.insert((SessionId(j), PaperId(p)));
    }

    instance
}

fn generate_catalog(instance: &InstanceData) -> PaperCatalog {
    let mut catalog = PaperCatalog::new();
    for &p in &instance.paper_ids {
        let authors = instance
            .authorship
            .iter()
            .filter(|(_, paper)| *paper == p)
            .map(|(a, _)| format!("Author {}", a))
            .collect();
        let topics = instance
            .paper_topics
            .iter()
            .filter(|(paper, _)| *paper == p)
            .map(|(_, t)| format!("Topic {}", t))
            .collect();
        catalog.insert(p, format!("Sample Paper {}", p), authors, topics);
    }
    catalog
}
