//! Scripted JSON-RPC node for unit tests
//!
//! Each method has a queue of replies. Replies are consumed in order and
//! the last one is repeated for any further request, so a single entry acts
//! as a fixed answer.

use alloy_primitives::{Address, B256};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Debug, Clone)]
enum Reply {
	Result(Value),
	Error(i64, String),
}

#[derive(Debug, Default)]
pub(crate) struct MockNode {
	replies: Mutex<HashMap<String, VecDeque<Reply>>>,
}

impl MockNode {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn result(self, rpc_method: &str, value: Value) -> Self {
		self.push(rpc_method, Reply::Result(value))
	}

	pub(crate) fn error(self, rpc_method: &str, code: i64, message: &str) -> Self {
		self.push(rpc_method, Reply::Error(code, message.to_string()))
	}

	fn push(self, rpc_method: &str, reply: Reply) -> Self {
		if let Ok(mut replies) = self.replies.lock() {
			replies.entry(rpc_method.to_string()).or_default().push_back(reply);
		}
		self
	}

	pub(crate) async fn start(self) -> MockServer {
		let server = MockServer::start().await;
		Mock::given(method("POST")).respond_with(self).mount(&server).await;
		server
	}

	/// How many requests for one RPC method the server received
	pub(crate) async fn count(server: &MockServer, rpc_method: &str) -> usize {
		server
			.received_requests()
			.await
			.unwrap_or_default()
			.iter()
			.filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
			.filter(|body| body["method"] == rpc_method)
			.count()
	}

	fn next(&self, rpc_method: &str) -> Option<Reply> {
		let mut replies = self.replies.lock().ok()?;
		let queue = replies.get_mut(rpc_method)?;
		if queue.len() > 1 {
			queue.pop_front()
		} else {
			queue.front().cloned()
		}
	}
}

impl Respond for MockNode {
	fn respond(&self, request: &Request) -> ResponseTemplate {
		let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
		let id = body["id"].clone();
		let rpc_method = body["method"].as_str().unwrap_or_default();

		let response = match self.next(rpc_method) {
			Some(Reply::Result(result)) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
			Some(Reply::Error(code, message)) => {
				json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
			},
			None => json!({
				"jsonrpc": "2.0",
				"id": id,
				"error": { "code": -32601, "message": format!("method {} not scripted", rpc_method) }
			}),
		};

		ResponseTemplate::new(200).set_body_json(response)
	}
}

/// Minimal legacy transaction receipt as a node would return it
pub(crate) fn receipt_json(hash: B256, contract_address: Option<Address>, success: bool) -> Value {
	json!({
		"transactionHash": hash,
		"transactionIndex": "0x0",
		"blockHash": B256::repeat_byte(0xbb),
		"blockNumber": "0x1",
		"from": Address::repeat_byte(0xf3),
		"to": if contract_address.is_some() { Value::Null } else { json!(Address::repeat_byte(0xcc)) },
		"cumulativeGasUsed": "0x1d4c0",
		"gasUsed": "0x1d4c0",
		"effectiveGasPrice": "0x4a817c800",
		"contractAddress": contract_address,
		"logs": [],
		"logsBloom": format!("0x{}", "00".repeat(256)),
		"status": if success { "0x1" } else { "0x0" },
		"type": "0x0"
	})
}
