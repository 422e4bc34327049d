// system-tests/tests/suites/network_validation.rs
// ============================================================================
// Module: Network Validation Tests
// Description: Static MAC policy enforcement and deployed address fidelity.
// Purpose: Verify addressing rules at plan time and on the wire after deploy.
// Dependencies: system-tests helpers, armada-client, armada-model
// ============================================================================

//! Network addressing coverage for Armada system-tests.

use armada_client::CliErrorKind;
use armada_client::DEFAULT_POLL_INTERVAL;
use armada_client::probes::port_open;
use armada_client::wait_for_plan_state;
use armada_model::MacAddr;
use armada_model::PlanState;
use armada_model::Properties;
use armada_remote::CommandRunner;
use helpers::artifacts::TestReporter;
use helpers::cluster::ClusterFixture;
use helpers::fixtures::GATEWAY;
use helpers::fixtures::SERVICE_PORT;
use helpers::fixtures::ServiceFixture;
use helpers::remote_asserts::assert_neighbor_mac;
use helpers::remote_asserts::assert_ping;
use helpers::remote_asserts::read_instance_meta;
use helpers::remote_asserts::wait_for_success;
use helpers::timeouts::PLAN_BUDGET;
use helpers::timeouts::PROBE_BUDGET;
use helpers::timeouts::resolve_timeout;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn static_mac_rules_are_policed() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("static_mac_rules_are_policed")?;
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

    cluster.cli.restore_model().await?;
    let fixture = ServiceFixture::new(&node_names[..2]);
    fixture.apply(&cluster.cli).await?;
    let interface_path = fixture.interface_path("eth0")?;

    let first = fixture.mac_for(0, 0);
    let duplicated = format!("{first},{first}");
    cluster
        .cli
        .update(
            &interface_path,
            &Properties::new().with("macaddresses", duplicated),
            &[],
        )
        .await?;
    match cluster.cli.create_plan().await {
        Err(err) if matches!(err.cli_kind(), Some(CliErrorKind::Validation)) => {}
        Err(err) => return Err(format!("duplicate static MAC produced {err}").into()),
        Ok(()) => return Err("duplicate static MAC passed plan validation".into()),
    }

    cluster
        .cli
        .update(
            &interface_path,
            &Properties::new().with("macaddresses", "00:11:22:33:44:55,00:11:22:33:44:66"),
            &[],
        )
        .await?;
    match cluster.cli.create_plan().await {
        Err(err) if matches!(err.cli_kind(), Some(CliErrorKind::Validation)) => {}
        Err(err) => {
            return Err(format!("universally administered MAC produced {err}").into());
        }
        Ok(()) => {
            return Err("universally administered MAC passed plan validation".into());
        }
    }

    cluster.cli.restore_model().await?;
    if cluster.query.exists(&fixture.clustered_service_path()?).await? {
        return Err("restore_model kept the uncommitted clustered service".into());
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
            "duplicate and universally administered static MACs both fail plan validation"
                .to_string(),
            "restore_model discarded the rejected edits".to_string(),
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

#[tokio::test(flavor = "multi_thread")]
#[allow(
    clippy::too_many_lines,
    reason = "Model, metadata, and on-wire address checks stay in one linear script."
)]
async fn deployed_addresses_match_model() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("deployed_addresses_match_model")?;
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
    cluster.cli.run_plan().await?;
    let plan_budget = resolve_timeout(PLAN_BUDGET)?;
    wait_for_plan_state(
        &cluster.query,
        PlanState::Successful,
        DEFAULT_POLL_INTERVAL,
        plan_budget,
    )
    .await?;

    let interface_path = fixture.interface_path("eth0")?;
    let model_list = cluster.query.get_property(&interface_path, "macaddresses").await?;
    let model_macs: Vec<MacAddr> = model_list
        .split(',')
        .map(MacAddr::parse)
        .collect::<Result<_, _>>()
        .map_err(|err| format!("model macaddresses {model_list:?}: {err}"))?;
    if model_macs.len() != fixture.nodes.len() {
        return Err(format!(
            "model lists {} static MACs for {} instances",
            model_macs.len(),
            fixture.nodes.len()
        )
        .into());
    }

    let probe_budget = resolve_timeout(PROBE_BUDGET)?;
    let management = cluster.management_runner();
    for (index, name) in fixture.nodes.iter().enumerate() {
        let instance = u8::try_from(index)?;
        let Some(runner) = cluster.node_runner(name) else {
            return Err(format!("node {name} has no configured runner").into());
        };
        let wanted_mac = MacAddr::parse(&fixture.mac_for(0, instance))?;
        let wanted_ip = fixture.ip_for(0, instance);
        if model_macs[index] != wanted_mac {
            return Err(format!(
                "model assigns {} to instance {instance}, fixture expected {wanted_mac}",
                model_macs[index]
            )
            .into());
        }

        let meta = read_instance_meta(&runner, &fixture.service).await?;
        let Some(iface) = meta.interface("eth0") else {
            return Err(format!("instance meta on {name} lists no eth0").into());
        };
        if iface.mac != wanted_mac || iface.ipaddress != wanted_ip {
            return Err(format!(
                "eth0 on {name} carries {}/{}, model assigned {wanted_mac}/{wanted_ip}",
                iface.mac, iface.ipaddress
            )
            .into());
        }

        wait_for_success(
            &management,
            &port_open(&wanted_ip.to_string(), SERVICE_PORT),
            probe_budget,
            &format!("service port on {wanted_ip}"),
        )
        .await?;
        assert_neighbor_mac(&management, wanted_ip, &wanted_mac).await?;
        assert_ping(&runner, &GATEWAY.to_string()).await?;
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
            "model MACs, instance metadata, and neighbor cache entries all agree".to_string(),
            "every instance answers at its model address and reaches the gateway".to_string(),
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
