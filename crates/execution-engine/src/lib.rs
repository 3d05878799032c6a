/*
 * DAC Execution Engine - Kubernetes Controllers for Data Agent Containers
 * Copyright (C) 2025 DAC team
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::doc_markdown)]

//! DAC execution engine
//!
//! Reconciles `DataAgentContainer` resources into their agent workloads and drives the
//! ingestion of every source declared by a `DataDescriptor`.

pub mod crds;
pub mod tasks;

pub use crds::{
    DataAgentContainer, DataAgentContainerSpec, DataAgentContainerStatus, DataDescriptor,
    DataDescriptorSpec, DataDescriptorStatus,
};
pub use tasks::config::ControllerConfig;
pub use tasks::run_task_controller;
