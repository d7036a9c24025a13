use mhs_dds_core::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_transactions_are_serialised() {
    let shared = SharedGenerator::new(Generator::with_transport(SimulatedInstrument::new()));

    let mut handles = Vec::new();
    for i in 1..=8u32 {
        let handle = shared.clone();
        handles.push(tokio::spawn(async move {
            handle.set_frequency(1, f64::from(i * 1000)).await
        }));
    }
    for handle in handles {
        let reply = handle.await.unwrap().unwrap();
        assert_eq!(reply.text(), "ok");
    }

    let lines = shared
        .with(|dds| Ok(dds.connection().transport().received().to_vec()))
        .await
        .unwrap();

    // Each probe is immediately followed by its own command
    assert_eq!(lines.len(), 16);
    for pair in lines.chunks(2) {
        assert_eq!(pair[0], ":");
        assert!(pair[1].starts_with(":s1f"));
    }
}

#[tokio::test]
async fn test_execute_and_read_back() {
    let shared = SharedGenerator::new(Generator::with_transport(SimulatedInstrument::new()));
    shared
        .execute(Command::set(Address::channel(2), Opcode::Phase, 90))
        .await
        .unwrap();

    let phase = shared
        .with(|dds| Ok(dds.query(2, Opcode::Phase)?.parse_integer()))
        .await
        .unwrap();
    assert_eq!(phase, Some(90));
}

#[tokio::test]
async fn test_errors_propagate() {
    let shared = SharedGenerator::new(Generator::with_transport(SimulatedInstrument::new()));
    let result = shared.with(|dds| dds.set_pulse_time(1, 10.0)).await;
    assert!(matches!(result, Err(ProtocolError::Unsupported(_))));
}
