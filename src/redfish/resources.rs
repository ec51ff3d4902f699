//! Redfish resource documents
//!
//! Plain serde structures for the documents the service exposes. Field names
//! follow the DMTF schema casing.

use serde::Serialize;

use super::actions::ResetType;
use super::boot::BootOverride;
use crate::atx::PowerState;

pub const SERVICE_ROOT: &str = "/redfish/v1";
pub const SYSTEMS: &str = "/redfish/v1/Systems";
pub const SYSTEM: &str = "/redfish/v1/Systems/System.1";
pub const SYSTEM_RESET: &str = "/redfish/v1/Systems/System.1/Actions/ComputerSystem.Reset";
pub const MANAGERS: &str = "/redfish/v1/Managers";
pub const MANAGER: &str = "/redfish/v1/Managers/BMC";
pub const CHASSIS_COLLECTION: &str = "/redfish/v1/Chassis";
pub const CHASSIS: &str = "/redfish/v1/Chassis/System";

pub const REDFISH_VERSION: &str = "1.8.0";

/// `{"@odata.id": ...}` reference
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    #[serde(rename = "@odata.id")]
    pub odata_id: &'static str,
}

impl Link {
    pub fn to(odata_id: &'static str) -> Self {
        Self { odata_id }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "@odata.id")]
    pub odata_id: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub redfish_version: &'static str,
    pub systems: Link,
    pub managers: Link,
    pub chassis: Link,
}

impl ServiceRoot {
    pub fn new() -> Self {
        Self {
            odata_type: "#ServiceRoot.v1_5_0.ServiceRoot",
            odata_id: SERVICE_ROOT,
            id: "RootService",
            name: "NanoKVM Redfish Service",
            redfish_version: REDFISH_VERSION,
            systems: Link::to(SYSTEMS),
            managers: Link::to(MANAGERS),
            chassis: Link::to(CHASSIS_COLLECTION),
        }
    }
}

impl Default for ServiceRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Resource collection with a single member
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Collection {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "@odata.id")]
    pub odata_id: &'static str,
    pub name: &'static str,
    #[serde(rename = "Members@odata.count")]
    pub members_count: usize,
    pub members: Vec<Link>,
}

impl Collection {
    fn new(
        odata_type: &'static str,
        odata_id: &'static str,
        name: &'static str,
        members: Vec<Link>,
    ) -> Self {
        Self {
            odata_type,
            odata_id,
            name,
            members_count: members.len(),
            members,
        }
    }

    pub fn systems() -> Self {
        Self::new(
            "#ComputerSystemCollection.ComputerSystemCollection",
            SYSTEMS,
            "Computer System Collection",
            vec![Link::to(SYSTEM)],
        )
    }

    pub fn managers() -> Self {
        Self::new(
            "#ManagerCollection.ManagerCollection",
            MANAGERS,
            "Manager Collection",
            vec![Link::to(MANAGER)],
        )
    }

    pub fn chassis() -> Self {
        Self::new(
            "#ChassisCollection.ChassisCollection",
            CHASSIS_COLLECTION,
            "Chassis Collection",
            vec![Link::to(CHASSIS)],
        )
    }
}

/// Boot object of a ComputerSystem
#[derive(Debug, Serialize)]
pub struct Boot {
    #[serde(rename = "BootSourceOverrideEnabled")]
    pub enabled: String,
    #[serde(rename = "BootSourceOverrideMode", skip_serializing_if = "String::is_empty")]
    pub mode: String,
    #[serde(rename = "BootSourceOverrideTarget")]
    pub target: String,
    #[serde(rename = "BootSourceOverrideTarget@Redfish.AllowableValues")]
    pub allowable_targets: &'static [&'static str],
}

impl From<&BootOverride> for Boot {
    fn from(boot: &BootOverride) -> Self {
        Self {
            enabled: boot.enabled.clone(),
            mode: boot.mode.clone(),
            target: boot.target.clone(),
            allowable_targets: boot.allowable_targets,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResetActionInfo {
    pub target: &'static str,
    #[serde(rename = "ResetType@Redfish.AllowableValues")]
    pub allowable_values: [&'static str; 4],
}

#[derive(Debug, Serialize)]
pub struct SystemActions {
    #[serde(rename = "#ComputerSystem.Reset")]
    pub reset: ResetActionInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "@odata.id")]
    pub odata_id: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub power_state: PowerState,
    pub boot: Boot,
    pub actions: SystemActions,
}

impl ComputerSystem {
    pub fn new(power_state: PowerState, boot: &BootOverride) -> Self {
        Self {
            odata_type: "#ComputerSystem.v1_13_0.ComputerSystem",
            odata_id: SYSTEM,
            id: "System.1",
            name: "NanoKVM System",
            power_state,
            boot: Boot::from(boot),
            actions: SystemActions {
                reset: ResetActionInfo {
                    target: SYSTEM_RESET,
                    allowable_values: ResetType::ALLOWABLE_VALUES,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub state: &'static str,
    pub health: &'static str,
}

impl Status {
    pub fn healthy() -> Self {
        Self {
            state: "Enabled",
            health: "OK",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manager {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "@odata.id")]
    pub odata_id: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub manager_type: &'static str,
    pub firmware_version: &'static str,
    pub status: Status,
}

impl Manager {
    pub fn bmc() -> Self {
        Self {
            odata_type: "#Manager.v1_5_0.Manager",
            odata_id: MANAGER,
            id: "BMC",
            name: "NanoKVM Manager",
            manager_type: "BMC",
            firmware_version: env!("CARGO_PKG_VERSION"),
            status: Status::healthy(),
        }
    }
}

/// Vendor extension carried on the chassis
#[derive(Debug, Serialize)]
pub struct ChassisOem {
    #[serde(rename = "NanoKVM")]
    pub nanokvm: NanoKvmChassisOem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NanoKvmChassisOem {
    pub hardware_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_activity: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chassis {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "@odata.id")]
    pub odata_id: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub chassis_type: &'static str,
    pub status: Status,
    pub oem: ChassisOem,
}

impl Chassis {
    pub fn new(hardware_version: &'static str, disk_activity: Option<bool>) -> Self {
        Self {
            odata_type: "#Chassis.v1_10_0.Chassis",
            odata_id: CHASSIS,
            id: "System",
            name: "NanoKVM System Chassis",
            chassis_type: "RackMount",
            status: Status::healthy(),
            oem: ChassisOem {
                nanokvm: NanoKvmChassisOem {
                    hardware_version,
                    disk_activity,
                },
            },
        }
    }
}
