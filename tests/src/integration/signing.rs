//! # Multi-Node Signing Flow
//!
//! Three independent signing services sign the same message; any of them
//! aggregates the shares through the hex surface, and the aggregate
//! verifies against the EIP-2537 encodings alone.

#[cfg(test)]
mod tests {
    use bn_01_bls_engine::{
        decode_g2, message_point, verify_aggregate, AggregateRequest, BlsPublicKey,
        BlsSigningApi, BlsSigningService, InMemoryChainClient, NodeIdentity, ShareInput,
        SignRequest, SignResponse, SigningError, G1_ENCODED_LEN, G2_ENCODED_LEN,
    };
    use shared_types::{decode_fixed_hex, encode_hex};

    const MESSAGE: &str = "Hello World";

    fn nodes(count: usize) -> Vec<BlsSigningService<InMemoryChainClient>> {
        (0..count)
            .map(|_| BlsSigningService::new(NodeIdentity::generate(), InMemoryChainClient::new()))
            .collect()
    }

    fn sign_all(nodes: &[BlsSigningService<InMemoryChainClient>], message: &str) -> Vec<SignResponse> {
        nodes
            .iter()
            .map(|n| {
                n.handle_sign(&SignRequest {
                    message: message.to_string(),
                })
            })
            .collect()
    }

    fn request(responses: &[SignResponse], message: Option<&str>) -> AggregateRequest {
        AggregateRequest {
            shares: responses.iter().map(ShareInput::from).collect(),
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_three_nodes_sign_aggregate_verify() {
        let nodes = nodes(3);
        let responses = sign_all(&nodes, MESSAGE);

        let response = nodes[0]
            .handle_aggregate(&request(&responses, Some(MESSAGE)))
            .unwrap();

        assert_eq!(
            response.node_ids,
            responses.iter().map(|r| r.node_id.clone()).collect::<Vec<_>>()
        );
        let signature =
            decode_fixed_hex::<G2_ENCODED_LEN>("aggregateSignature", &response.aggregate_signature)
                .unwrap();
        let public_key =
            decode_fixed_hex::<G1_ENCODED_LEN>("aggregatePublicKey", &response.aggregate_public_key)
                .unwrap();

        // Any node, not only the aggregator, accepts the result.
        for node in &nodes {
            assert!(node.verify(MESSAGE.as_bytes(), &signature, &public_key).unwrap());
        }
        assert!(!nodes[1]
            .verify(b"Goodbye World", &signature, &public_key)
            .unwrap());

        let expected_point = encode_hex(&message_point(MESSAGE.as_bytes()).unwrap());
        assert_eq!(response.message_point, Some(expected_point));
    }

    #[test]
    fn test_aggregate_independent_of_share_order() {
        let nodes = nodes(3);
        let responses = sign_all(&nodes, MESSAGE);
        let mut reversed = responses.clone();
        reversed.reverse();

        let forward = nodes[0].handle_aggregate(&request(&responses, None)).unwrap();
        let backward = nodes[2].handle_aggregate(&request(&reversed, None)).unwrap();

        assert_eq!(forward.aggregate_signature, backward.aggregate_signature);
        assert_eq!(forward.aggregate_public_key, backward.aggregate_public_key);
        assert_eq!(forward.node_ids.first(), backward.node_ids.last());
    }

    #[test]
    fn test_aggregate_request_survives_json_transport() {
        let nodes = nodes(3);
        let responses = sign_all(&nodes, MESSAGE);

        let wire = serde_json::to_string(&request(&responses, Some(MESSAGE))).unwrap();
        assert!(wire.contains("\"publicKey\""));
        let received: AggregateRequest = serde_json::from_str(&wire).unwrap();

        let response = nodes[1].handle_aggregate(&received).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["aggregateSignature"].as_str().unwrap().starts_with("0x"));
        assert_eq!(json["nodeIds"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_share_rejects_whole_aggregation() {
        let nodes = nodes(3);
        let mut responses = sign_all(&nodes, MESSAGE);
        // Infinity flag with nonzero coordinates is not a valid encoding.
        responses[1].signature = encode_hex(&[0xffu8; 96]);

        let err = nodes[0]
            .handle_aggregate(&request(&responses, Some(MESSAGE)))
            .unwrap_err();
        assert!(matches!(
            err,
            SigningError::InvalidPoint { index: 1, field: "signature", .. }
        ));
    }

    #[test]
    fn test_share_over_other_message_fails_verification() {
        let nodes = nodes(3);
        let mut responses = sign_all(&nodes[..2], MESSAGE);
        responses.extend(sign_all(&nodes[2..], "Goodbye World"));

        let err = nodes[0]
            .handle_aggregate(&request(&responses, Some(MESSAGE)))
            .unwrap_err();
        assert_eq!(err, SigningError::VerificationFailed);

        // Without a message the points are still summed.
        assert!(nodes[0].handle_aggregate(&request(&responses, None)).is_ok());
    }

    #[test]
    fn test_distinct_messages_verify_as_aggregate() {
        let nodes = nodes(3);
        let messages: Vec<String> = (0..3).map(|i| format!("{MESSAGE} #{i}")).collect();
        let shares: Vec<_> = nodes
            .iter()
            .zip(&messages)
            .map(|(n, m)| n.sign(m.as_bytes()).to_share())
            .collect();

        let result = nodes[0].aggregate(&shares).unwrap();
        let signature = decode_g2(&result.aggregate_signature).unwrap();
        let public_keys: Vec<BlsPublicKey> =
            nodes.iter().map(|n| n.public_key().clone()).collect();
        let message_refs: Vec<&[u8]> = messages.iter().map(|m| m.as_bytes()).collect();

        assert!(verify_aggregate(&message_refs, &signature, &public_keys));
    }

    #[test]
    fn test_empty_share_set_rejected() {
        let nodes = nodes(1);
        let err = nodes[0]
            .handle_aggregate(&AggregateRequest::default())
            .unwrap_err();
        assert_eq!(err, SigningError::EmptyInput);
    }

    #[tokio::test]
    async fn test_registration_does_not_gate_signing() {
        let nodes = nodes(2);
        let status = nodes[0].registration_status().await;
        assert!(status.success);

        let registered = nodes[0].register_on_chain().await;
        assert!(registered.success);
        assert!(registered.tx_hash.is_some());

        // Registered or not, shares from both aggregate.
        let responses = sign_all(&nodes, MESSAGE);
        assert!(nodes[1]
            .handle_aggregate(&request(&responses, Some(MESSAGE)))
            .is_ok());
    }
}
