// system-tests/tests/suites/plan_lifecycle.rs
// ============================================================================
// Module: Plan Lifecycle Tests
// Description: Plan mechanics: lock bracketing, stop, and model errors.
// Purpose: Verify plan structure and the CLI's typed failure modes.
// Dependencies: system-tests helpers, armada-client, armada-model
// ============================================================================

//! Plan lifecycle coverage for Armada system-tests.

use armada_client::CliErrorKind;
use armada_client::DEFAULT_POLL_INTERVAL;
use armada_client::wait_for_plan_state;
use armada_model::ItemType;
use armada_model::ModelPath;
use armada_model::PlanState;
use armada_model::Properties;
use armada_remote::CommandRunner;
use helpers::artifacts::TestReporter;
use helpers::cluster::ClusterFixture;
use helpers::fixtures::ServiceFixture;
use helpers::timeouts::PLAN_BUDGET;
use helpers::timeouts::resolve_timeout;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
#[allow(
    clippy::too_many_lines,
    reason = "Lock bracketing, stop, and resume stay in one linear script."
)]
async fn plan_brackets_node_work_with_locks() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("plan_brackets_node_work_with_locks")?;
    let Some(cluster) = ClusterFixture::from_env()? else {
        reporter.finish(
            "skip",
            vec!["no management server configured".to_string()],
            vec!["summary.json".to_string(), "summary.md".to_string()],
        )?;
        drop(reporter);
        return Ok(());
    };
    let node_names = cluster.node_names();
    if node_names.len() < 2 {
        reporter.finish(
            "skip",
            vec!["cluster provides fewer than two nodes".to_string()],
            vec!["summary.json".to_string(), "summary.md".to_string()],
        )?;
        drop(reporter);
        return Ok(());
    }

    let fixture = ServiceFixture::new(&node_names[..2]);
    fixture.apply(&cluster.cli).await?;
    cluster.cli.create_plan().await?;

    let report = cluster.cli.show_plan().await?;
    for name in &fixture.nodes {
        let Some(lock_phase) = report.lock_phase_for(name) else {
            return Err(format!("plan carries no lock phase for node {name}").into());
        };
        let Some(unlock_phase) = report.unlock_phase_for(name) else {
            return Err(format!("plan carries no unlock phase for node {name}").into());
        };
        let work_phases = report.work_phases_for(name);
        if work_phases.is_empty() {
            return Err(format!("plan carries no work phases for node {name}").into());
        }
        let Some(first_work) = work_phases.iter().min() else {
            return Err(format!("plan carries no work phases for node {name}").into());
        };
        let Some(last_work) = work_phases.iter().max() else {
            return Err(format!("plan carries no work phases for node {name}").into());
        };
        if lock_phase >= *first_work || *last_work >= unlock_phase {
            return Err(format!(
                "node {name} work in phases {work_phases:?} is not bracketed by lock \
                 phase {lock_phase} and unlock phase {unlock_phase}"
            )
            .into());
        }
    }
    let initial_plan = cluster.query.plan_document().await?;
    reporter.artifacts().write_json("plan_initial.json", &initial_plan)?;

    let plan_budget = resolve_timeout(PLAN_BUDGET)?;
    cluster.cli.run_plan().await?;
    let stopped = match cluster.cli.stop_plan().await {
        Ok(()) => {
            wait_for_plan_state(
                &cluster.query,
                PlanState::Stopped,
                DEFAULT_POLL_INTERVAL,
                plan_budget,
            )
            .await?;
            true
        }
        Err(err) if matches!(err.cli_kind(), Some(CliErrorKind::PlanState)) => {
            wait_for_plan_state(
                &cluster.query,
                PlanState::Successful,
                DEFAULT_POLL_INTERVAL,
                plan_budget,
            )
            .await?;
            false
        }
        Err(err) => return Err(err.into()),
    };
    if stopped {
        cluster.cli.remove_plan().await?;
        cluster.cli.create_plan().await?;
        cluster.cli.run_plan().await?;
        wait_for_plan_state(
            &cluster.query,
            PlanState::Successful,
            DEFAULT_POLL_INTERVAL,
            plan_budget,
        )
        .await?;
    }

    fixture.teardown(&cluster.cli, &cluster.query).await?;

    reporter
        .artifacts()
        .write_command_transcript("cli_transcript.json", &cluster.cli.runner().transcript())?;
    reporter
        .artifacts()
        .write_query_transcript("query_transcript.json", &cluster.query.transcript())?;
    reporter.finish(
        "pass",
        vec![
            "every node's work phases sit strictly between its lock and unlock".to_string(),
            if stopped {
                "stop_plan halted at a phase boundary and a fresh plan finished the job"
                    .to_string()
            } else {
                "plan outran stop_plan; completion path verified instead".to_string()
            },
        ],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "plan_initial.json".to_string(),
            "cli_transcript.json".to_string(),
            "query_transcript.json".to_string(),
        ],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn model_edit_errors_and_restore() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("model_edit_errors_and_restore")?;
    let Some(cluster) = ClusterFixture::from_env()? else {
        reporter.finish(
            "skip",
            vec!["no management server configured".to_string()],
            vec!["summary.json".to_string(), "summary.md".to_string()],
        )?;
        drop(reporter);
        return Ok(());
    };

    cluster.cli.restore_model().await?;
    match cluster.cli.create_plan().await {
        Err(err) if matches!(err.cli_kind(), Some(CliErrorKind::NoOpPlan)) => {}
        Err(err) => return Err(format!("converged model produced {err}").into()),
        Ok(()) => return Err("converged model produced a plan instead of NoOpPlanError".into()),
    }

    let fixture = ServiceFixture::new(&cluster.node_names());
    let image_path = fixture.image_path()?;
    cluster.cli.create(&ItemType::vm_image(), &image_path, &fixture.image_props()).await?;
    match cluster.cli.create(&ItemType::vm_image(), &image_path, &fixture.image_props()).await {
        Err(err) if matches!(err.cli_kind(), Some(CliErrorKind::ItemExists)) => {}
        Err(err) => return Err(format!("duplicate create produced {err}").into()),
        Ok(()) => return Err("duplicate create succeeded instead of ItemExistsError".into()),
    }

    let bogus = ModelPath::parse("/bogus/images/orphan")?;
    match cluster
        .cli
        .create(&ItemType::vm_image(), &bogus, &Properties::new().with("version", "1.0.0"))
        .await
    {
        Err(err) if matches!(err.cli_kind(), Some(CliErrorKind::InvalidLocation)) => {}
        Err(err) => return Err(format!("create under missing parent produced {err}").into()),
        Ok(()) => {
            return Err("create under missing parent succeeded instead of \
                        InvalidLocationError"
                .into());
        }
    }

    cluster.cli.restore_model().await?;
    if cluster.query.exists(&image_path).await? {
        return Err("restore_model kept the uncommitted image item".into());
    }

    reporter
        .artifacts()
        .write_command_transcript("cli_transcript.json", &cluster.cli.runner().transcript())?;
    reporter
        .artifacts()
        .write_query_transcript("query_transcript.json", &cluster.query.transcript())?;
    reporter.finish(
        "pass",
        vec![
            "no-op plan, duplicate create, and bad location all fail with typed errors"
                .to_string(),
            "restore_model discarded the uncommitted item".to_string(),
        ],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "cli_transcript.json".to_string(),
            "query_transcript.json".to_string(),
        ],
    )?;
    drop(reporter);
    Ok(())
}
