// system-tests/tests/suites/service_provision.rs
// ============================================================================
// Module: Service Provision Tests
// Description: End-to-end provisioning of a clustered VM service.
// Purpose: Verify model edits deploy to running, reachable VM instances.
// Dependencies: system-tests helpers, armada-client, armada-model
// ============================================================================

//! Service provisioning coverage for Armada system-tests.

use armada_client::DEFAULT_POLL_INTERVAL;
use armada_client::probes::image_store_path;
use armada_client::probes::instance_unit_name;
use armada_client::probes::port_open;
use armada_client::probes::unit_active;
use armada_client::wait_for_absence;
use armada_client::wait_for_item_state;
use armada_client::wait_for_plan_state;
use armada_model::ItemState;
use armada_model::MacAddr;
use armada_model::PlanState;
use armada_remote::CommandRunner;
use helpers::artifacts::TestReporter;
use helpers::cluster::ClusterFixture;
use helpers::fixtures::SERVICE_PORT;
use helpers::fixtures::ServiceFixture;
use helpers::remote_asserts::assert_path_exists;
use helpers::remote_asserts::assert_process_running;
use helpers::remote_asserts::read_instance_meta;
use helpers::remote_asserts::wait_for_success;
use helpers::timeouts::PLAN_BUDGET;
use helpers::timeouts::PROBE_BUDGET;
use helpers::timeouts::resolve_timeout;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
#[allow(
    clippy::too_many_lines,
    reason = "End-to-end provisioning flow stays linear for auditability."
)]
async fn two_node_service_provisions_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("two_node_service_provisions_end_to_end")?;
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
    let initial_plan = cluster.query.plan_document().await?;
    reporter.artifacts().write_json("plan_initial.json", &initial_plan)?;

    cluster.cli.run_plan().await?;
    let plan_budget = resolve_timeout(PLAN_BUDGET)?;
    wait_for_plan_state(&cluster.query, PlanState::Successful, DEFAULT_POLL_INTERVAL, plan_budget)
        .await?;
    let final_plan = cluster.query.plan_document().await?;
    reporter.artifacts().write_json("plan_final.json", &final_plan)?;

    let probe_budget = resolve_timeout(PROBE_BUDGET)?;
    for path in [
        fixture.image_path()?,
        fixture.software_service_path()?,
        fixture.clustered_service_path()?,
        fixture.application_path()?,
    ] {
        wait_for_item_state(
            &cluster.query,
            &path,
            ItemState::Applied,
            DEFAULT_POLL_INTERVAL,
            probe_budget,
        )
        .await?;
    }

    let model_macs = cluster
        .query
        .get_property(&fixture.interface_path("eth0")?, "macaddresses")
        .await?;
    if model_macs != fixture.mac_list(0, 2) {
        return Err(format!(
            "query served macaddresses {model_macs}, fixture assigned {}",
            fixture.mac_list(0, 2)
        )
        .into());
    }

    let management = cluster.management_runner();
    let unit = instance_unit_name(&fixture.service);
    for (index, name) in fixture.nodes.iter().enumerate() {
        let instance = u8::try_from(index)?;
        let Some(runner) = cluster.node_runner(name) else {
            return Err(format!("node {name} has no configured runner").into());
        };
        wait_for_success(
            &runner,
            &unit_active(&unit),
            probe_budget,
            &format!("unit {unit} active on {name}"),
        )
        .await?;
        assert_process_running(&runner, "qemu-kvm").await?;
        assert_path_exists(&runner, &image_store_path(&fixture.image)).await?;

        let meta = read_instance_meta(&runner, &fixture.service).await?;
        if meta.service != fixture.service || meta.image != fixture.image {
            return Err(format!(
                "instance meta on {name} names {}/{}, fixture deployed {}/{}",
                meta.service, meta.image, fixture.service, fixture.image
            )
            .into());
        }
        let Some(iface) = meta.interface("eth0") else {
            return Err(format!("instance meta on {name} lists no eth0").into());
        };
        let wanted_mac = MacAddr::parse(&fixture.mac_for(0, instance))?;
        if iface.mac != wanted_mac {
            return Err(format!(
                "eth0 on {name} carries {}, model assigned {wanted_mac}",
                iface.mac
            )
            .into());
        }
        let wanted_ip = fixture.ip_for(0, instance);
        if iface.ipaddress != wanted_ip {
            return Err(format!(
                "eth0 on {name} carries {}, model assigned {wanted_ip}",
                iface.ipaddress
            )
            .into());
        }

        wait_for_success(
            &management,
            &port_open(&wanted_ip.to_string(), SERVICE_PORT),
            probe_budget,
            &format!("service port on {name} reachable"),
        )
        .await?;
    }

    fixture.teardown(&cluster.cli, &cluster.query).await?;
    wait_for_absence(
        &cluster.query,
        &fixture.clustered_service_path()?,
        DEFAULT_POLL_INTERVAL,
        probe_budget,
    )
    .await?;

    reporter
        .artifacts()
        .write_command_transcript("cli_transcript.json", &cluster.cli.runner().transcript())?;
    reporter
        .artifacts()
        .write_query_transcript("query_transcript.json", &cluster.query.transcript())?;
    reporter.finish(
        "pass",
        vec![
            format!("service {} deployed on {} and {}", fixture.service, fixture.nodes[0], fixture.nodes[1]),
            "instance metadata, image store, and service port all converged".to_string(),
            "removal plan returned the cluster to its baseline".to_string(),
        ],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "plan_initial.json".to_string(),
            "plan_final.json".to_string(),
            "cli_transcript.json".to_string(),
            "query_transcript.json".to_string(),
        ],
    )?;
    drop(reporter);
    Ok(())
}
