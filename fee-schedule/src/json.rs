//! On-disk JSON layout of a fee schedule.
//!
//! ```text
//! {
//!   "node":     { "baseFee": 1000000, "extras": [ { "name": "SIGNATURES", "includedCount": 1 } ] },
//!   "network":  { "multiplier": 9 },
//!   "extras":   [ { "name": "SIGNATURES", "fee": 1000000 } ],
//!   "services": [ { "name": "Crypto", "schedule": [
//!       { "name": "CryptoTransfer", "baseFee": 0, "extras": [ { "name": "ACCOUNTS", "includedCount": 2 } ] }
//!   ] } ]
//! }
//! ```
//!
//! Names the calculator does not know are skipped with a warning so that a
//! newer schedule still loads.

use {
    crate::{
        error::ScheduleError,
        extra::{Extra, FeeEntry},
        schedule::{FeeSchedule, NetworkFee, NodeFee, ServiceFee},
    },
    log::warn,
    serde::{Deserialize, Serialize},
    std::{
        collections::{btree_map::Entry, BTreeMap},
        str::FromStr,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeSchedule {
    pub node: RawNodeFee,
    pub network: RawNetworkFee,
    #[serde(default)]
    pub extras: Vec<RawExtraPrice>,
    #[serde(default)]
    pub services: Vec<RawService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodeFee {
    pub base_fee: u64,
    #[serde(default)]
    pub extras: Vec<RawIncluded>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNetworkFee {
    pub multiplier: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraPrice {
    pub name: String,
    pub fee: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncluded {
    pub name: String,
    pub included_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawService {
    pub name: String,
    pub schedule: Vec<RawServiceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawServiceEntry {
    pub name: String,
    pub base_fee: u64,
    #[serde(default)]
    pub extras: Vec<RawIncluded>,
}

fn parse_extra(name: &str, context: &str) -> Option<Extra> {
    match Extra::from_str(name) {
        Ok(extra) => Some(extra),
        Err(_) => {
            warn!("skipping unknown extra {name} in {context}");
            None
        }
    }
}

fn included_map(
    raw: &[RawIncluded],
    context: &str,
) -> Result<BTreeMap<Extra, u64>, ScheduleError> {
    let mut included = BTreeMap::new();
    for item in raw {
        let Some(extra) = parse_extra(&item.name, context) else {
            continue;
        };
        if included.insert(extra, item.included_count).is_some() {
            return Err(ScheduleError::DuplicateExtra {
                extra,
                context: context.to_string(),
            });
        }
    }
    Ok(included)
}

impl TryFrom<RawFeeSchedule> for FeeSchedule {
    type Error = ScheduleError;

    fn try_from(raw: RawFeeSchedule) -> Result<Self, Self::Error> {
        let node = NodeFee {
            base_fee: raw.node.base_fee,
            included: included_map(&raw.node.extras, "node")?,
        };

        let mut extras = BTreeMap::new();
        for price in &raw.extras {
            let Some(extra) = parse_extra(&price.name, "extras") else {
                continue;
            };
            if extras.insert(extra, price.fee).is_some() {
                return Err(ScheduleError::DuplicateExtra {
                    extra,
                    context: "extras".to_string(),
                });
            }
        }

        let mut services = BTreeMap::new();
        for service in &raw.services {
            for item in &service.schedule {
                let Ok(entry) = FeeEntry::from_str(&item.name) else {
                    warn!("skipping unknown fee entry {}/{}", service.name, item.name);
                    continue;
                };
                let fee = ServiceFee {
                    base_fee: item.base_fee,
                    included: included_map(&item.extras, &item.name)?,
                };
                match services.entry(entry) {
                    Entry::Vacant(slot) => {
                        slot.insert(fee);
                    }
                    Entry::Occupied(_) => return Err(ScheduleError::DuplicateEntry { entry }),
                }
            }
        }

        Ok(FeeSchedule {
            node,
            network: NetworkFee {
                multiplier: raw.network.multiplier,
            },
            extras,
            services,
        })
    }
}

fn raw_included(included: &BTreeMap<Extra, u64>) -> Vec<RawIncluded> {
    included
        .iter()
        .map(|(extra, count)| RawIncluded {
            name: extra.to_string(),
            included_count: *count,
        })
        .collect()
}

impl From<FeeSchedule> for RawFeeSchedule {
    fn from(schedule: FeeSchedule) -> Self {
        let mut services: Vec<RawService> = Vec::new();
        for (entry, fee) in &schedule.services {
            let item = RawServiceEntry {
                name: entry.to_string(),
                base_fee: fee.base_fee,
                extras: raw_included(&fee.included),
            };
            match services.iter_mut().find(|s| s.name == entry.service()) {
                Some(service) => service.schedule.push(item),
                None => services.push(RawService {
                    name: entry.service().to_string(),
                    schedule: vec![item],
                }),
            }
        }

        Self {
            node: RawNodeFee {
                base_fee: schedule.node.base_fee,
                extras: raw_included(&schedule.node.included),
            },
            network: RawNetworkFee {
                multiplier: schedule.network.multiplier,
            },
            extras: schedule
                .extras
                .iter()
                .map(|(extra, fee)| RawExtraPrice {
                    name: extra.to_string(),
                    fee: *fee,
                })
                .collect(),
            services,
        }
    }
}
