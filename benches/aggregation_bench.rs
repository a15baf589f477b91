//! Throughput of the two reports over a synthetic activity log.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use approval_center_core::logging::LogContext;
use approval_center_core::platform::MapFileResolver;
use approval_center_core::reporting::{ActivityAggregator, LatestStateResolver};
use approval_center_core::rules::{Rule, RuleDraft, RuleEntity};
use approval_center_core::storage::{ApprovalState, InMemoryActivityLog, NewActivity};

const FILES: i64 = 5_000;
const RULES: i64 = 20;

fn build_log() -> InMemoryActivityLog {
    let log = InMemoryActivityLog::new();
    for file_id in 0..FILES {
        let rule_id = file_id % RULES + 1;
        log.append(NewActivity::new(file_id, rule_id, ApprovalState::Pending, file_id));
        let outcome = if file_id % 3 == 0 {
            ApprovalState::Rejected
        } else {
            ApprovalState::Approved
        };
        log.append(NewActivity::new(file_id, rule_id, outcome, file_id + 10));
    }
    log
}

fn build_rules() -> Vec<Rule> {
    (1..=RULES)
        .map(|id| {
            Rule::from_draft(
                id,
                RuleDraft {
                    tag_pending: id * 10,
                    tag_approved: id * 10 + 1,
                    tag_rejected: id * 10 + 2,
                    approvers: vec![RuleEntity::user("alice")],
                    requesters: vec![RuleEntity::group("staff")],
                    description: format!("rule {}", id),
                },
            )
        })
        .collect()
}

fn bench_reports(c: &mut Criterion) {
    let log = build_log();
    let rules = build_rules();
    let files = (0..FILES).fold(MapFileResolver::new(), |f, id| {
        f.with_file(id, format!("/files/{}", id))
    });
    let ctx = LogContext::new("bench");

    c.bench_function("rule_kpis", |b| {
        b.iter(|| {
            ActivityAggregator::new(&log)
                .rule_kpis(black_box(&rules), &ctx)
                .unwrap()
        })
    });

    c.bench_function("latest_snapshots", |b| {
        b.iter(|| {
            LatestStateResolver::new(&log, &files)
                .snapshots(black_box(&ctx))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_reports);
criterion_main!(benches);
