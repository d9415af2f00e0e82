//! Usage model: workload plus calls on system boundary endpoints

use serde::{Deserialize, Serialize};

use super::{EndpointId, Literal};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageModel {
    pub name: String,
    pub scenarios: Vec<UsageScenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageScenario {
    pub name: String,
    pub workload: Workload,
    pub calls: Vec<SystemCall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Workload {
    /// Users arrive with the given mean inter-arrival time
    Open { inter_arrival_time: f64 },
    /// A fixed user population, each waiting `think_time` between iterations
    Closed { population: u32, think_time: f64 },
}

/// Call of one operation (by index into the endpoint interface's operations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemCall {
    pub endpoint: EndpointId,
    pub operation: usize,
    pub arguments: Vec<Literal>,
}
