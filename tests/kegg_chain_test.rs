use anyhow::Result;
use httpmock::prelude::*;
use std::time::Duration;
use zymeflow::adapters::kegg::KeggChainResolver;
use zymeflow::adapters::{ResolverClient, RetryPolicy};
use zymeflow::domain::ports::EnzymeResolver;
use zymeflow::{LigandQuery, ZymeError};

fn resolver(server: &MockServer) -> KeggChainResolver {
    let client = ResolverClient::new(RetryPolicy {
        max_retries: 0,
        ..RetryPolicy::default()
    });
    KeggChainResolver::new(client, server.base_url(), Duration::from_secs(5))
        .with_step_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_kegg_chain_reads_first_row_of_every_hop() -> Result<()> {
    let server = MockServer::start();

    let compound = server.mock(|when, then| {
        when.method(GET).path("/find/compound/chitin");
        then.status(200)
            .body("cpd:C00461\tChitin; beta-1,4-Poly-N-acetyl-D-glucosamine\ncpd:C05986\tChitosan\n");
    });
    let reaction = server.mock(|when, then| {
        when.method(GET).path("/link/reaction/cpd:C00461");
        then.status(200)
            .body("cpd:C00461\trn:R01206\ncpd:C00461\trn:R02334\n");
    });
    let enzyme = server.mock(|when, then| {
        when.method(GET).path("/link/enzyme/rn:R01206");
        then.status(200).body("rn:R01206\tec:3.2.1.14\n");
    });
    let entry = server.mock(|when, then| {
        when.method(GET).path("/get/ec:3.2.1.14");
        then.status(200).body(
            "ENTRY       EC 3.2.1.14                 Enzyme\n\
             NAME        chitinase;\n\
             \x20           chitodextrinase;\n\
             CLASS       Hydrolases;\n",
        );
    });

    let identity = resolver(&server)
        .resolve(&LigandQuery::new("chitin"))
        .await?
        .expect("enzyme identity");

    compound.assert();
    reaction.assert();
    enzyme.assert();
    entry.assert();
    assert_eq!(identity.name, "chitinase");
    Ok(())
}

#[tokio::test]
async fn test_empty_hop_ends_chain_without_error() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/find/compound/unobtainium");
        then.status(200).body("\n");
    });
    let reaction = server.mock(|when, then| {
        when.method(GET).path_contains("/link/");
        then.status(200).body("unused");
    });

    let identity = resolver(&server)
        .resolve(&LigandQuery::new("unobtainium"))
        .await?;

    assert!(identity.is_none());
    reaction.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_empty_reaction_link_is_none() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/find/compound/glucose");
        then.status(200).body("cpd:C00031\tD-Glucose\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/link/reaction/cpd:C00031");
        then.status(200).body("");
    });

    let identity = resolver(&server)
        .resolve(&LigandQuery::new("glucose"))
        .await?;

    assert!(identity.is_none());
    Ok(())
}

#[tokio::test]
async fn test_bad_request_names_the_failing_step() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/find/compound/PGA");
        then.status(400);
    });

    let err = resolver(&server)
        .resolve(&LigandQuery::new("PGA"))
        .await
        .unwrap_err();

    assert!(matches!(err, ZymeError::FatalService { status: Some(400), .. }));
    assert!(err.to_string().starts_with("KEGG compound search failed"));
    assert!(!err.is_not_found());
}
