//! GraphQL store driver
//!
//! Talks to an Infrahub-style graph-data API: every call is a POST of
//! `{query, variables}` against `/graphql/main` with a key header. Records
//! are navigated as JSON values; the node shapes are small enough that typed
//! response structs would not pay for themselves.

use anyhow::Result;
use reqwest::Client;
use serde_json::{json, Value};
use std::net::Ipv4Addr;

use async_trait::async_trait;
use ipam_core::{parse_cidr, parse_ipv4, IpRecord, PrefixRecord, SubnetRecord, SubnetRole};
use ipnet::Ipv4Net;

use crate::config::StoreConfig;
use crate::store::{IpamStore, StoreError};

pub struct GraphQlStore {
    client: Client,
    base_url: String,
    token: String,
}

impl GraphQlStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Execute one GraphQL request and return its `data` value.
    async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        let url = format!("{}/graphql/main", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("X-INFRAHUB-KEY", &self.token)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(StoreError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(StoreError::Api {
                message: format!("request failed: {} - {}", status, text),
            }
            .into());
        }

        let body: Value = response.json().await.map_err(StoreError::from)?;

        if let Some(errors) = body.get("errors") {
            return Err(StoreError::Api {
                message: format!("GraphQL errors: {}", errors),
            }
            .into());
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Edges array at `data.{object}.edges`, or empty.
    fn edges(data: &Value, object: &str) -> Vec<Value> {
        data[object]["edges"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    fn node_id(node: &Value) -> Result<String> {
        node["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::Api {
                    message: format!("node without id: {}", node),
                }
                .into()
            })
    }

    /// First existing id for a lookup query, if any.
    async fn find_id(&self, query: &str, variables: Value, object: &str) -> Result<Option<String>> {
        let data = self.execute(query, variables).await?;
        match Self::edges(&data, object).first() {
            Some(edge) => Ok(Some(Self::node_id(&edge["node"])?)),
            None => Ok(None),
        }
    }
}

/// Display name for a subnet record, following the site convention: 192.x
/// networks are numbered LANs, 10.x networks are named by their middle
/// octets.
fn subnet_display_name(subnet: Ipv4Net) -> String {
    let octets = subnet.network().octets();
    match octets[0] {
        192 => format!("lan{}", octets[2]),
        10 => format!("subnet-10.{}.{}", octets[1], octets[2]),
        _ => format!("subnet-{}", subnet.network()),
    }
}

#[async_trait]
impl IpamStore for GraphQlStore {
    async fn list_prefixes(&self) -> Result<Vec<PrefixRecord>> {
        let query = r#"
        {
          IpamPrefix {
            edges { node { id prefix { value } } }
          }
        }
        "#;

        let data = self.execute(query, json!({})).await?;
        let mut records = Vec::new();
        for edge in Self::edges(&data, "IpamPrefix") {
            let node = &edge["node"];
            let value = node["prefix"]["value"].as_str().unwrap_or_default();
            match parse_cidr(value) {
                Ok(prefix) => records.push(PrefixRecord {
                    id: Self::node_id(node)?,
                    prefix,
                }),
                Err(err) => log::warn!("skipping prefix record: {}", err),
            }
        }
        Ok(records)
    }

    async fn ensure_prefix(&self, prefix: Ipv4Net) -> Result<String> {
        let lookup = r#"
        query GetPrefix($prefix: String!) {
          IpamPrefix(prefix__value: $prefix) {
            edges { node { id } }
          }
        }
        "#;

        let prefix_str = prefix.to_string();
        if let Some(id) = self
            .find_id(lookup, json!({ "prefix": prefix_str }), "IpamPrefix")
            .await?
        {
            return Ok(id);
        }

        let mutation = r#"
        mutation CreatePrefix($prefix: String!, $description: String!) {
          IpamPrefixCreate(
            data: {
              prefix: {value: $prefix}
              description: {value: $description}
              status: {value: "active"}
            }
          ) {
            ok
            object { id }
          }
        }
        "#;

        let data = self
            .execute(
                mutation,
                json!({
                    "prefix": prefix_str,
                    "description": format!("Prefix {}", prefix_str),
                }),
            )
            .await?;

        if !data["IpamPrefixCreate"]["ok"].as_bool().unwrap_or(false) {
            return Err(StoreError::Api {
                message: format!("failed to create prefix {}", prefix_str),
            }
            .into());
        }
        log::info!("created prefix {}", prefix_str);
        Self::node_id(&data["IpamPrefixCreate"]["object"])
    }

    async fn list_subnets(&self) -> Result<Vec<SubnetRecord>> {
        let query = r#"
        {
          IpamSubnet {
            edges {
              node {
                id
                subnet { value }
                subnet_type { value }
                parent_subnet { node { id } }
              }
            }
          }
        }
        "#;

        let data = self.execute(query, json!({})).await?;
        let mut records = Vec::new();
        for edge in Self::edges(&data, "IpamSubnet") {
            let node = &edge["node"];
            let value = node["subnet"]["value"].as_str().unwrap_or_default();
            let subnet = match parse_cidr(value) {
                Ok(subnet) => subnet,
                Err(err) => {
                    log::warn!("skipping subnet record: {}", err);
                    continue;
                }
            };

            // Untyped rows default to parent, matching role derivation for
            // everything that is not a /29 or /30.
            let role = node["subnet_type"]["value"]
                .as_str()
                .and_then(|s| s.parse::<SubnetRole>().ok())
                .unwrap_or(SubnetRole::Parent);

            let parent_id = node["parent_subnet"]["node"]["id"]
                .as_str()
                .map(str::to_string);

            records.push(SubnetRecord {
                id: Self::node_id(node)?,
                subnet,
                role,
                parent_id,
            });
        }
        Ok(records)
    }

    async fn ensure_subnet(&self, subnet: Ipv4Net, prefix_id: &str) -> Result<String> {
        let lookup = r#"
        query GetSubnet($subnet: String!) {
          IpamSubnet(subnet__value: $subnet) {
            edges { node { id } }
          }
        }
        "#;

        let subnet_str = subnet.to_string();
        if let Some(id) = self
            .find_id(lookup, json!({ "subnet": subnet_str }), "IpamSubnet")
            .await?
        {
            return Ok(id);
        }

        let mutation = r#"
        mutation CreateSubnet($subnet: String!, $name: String!, $prefix_id: String!) {
          IpamSubnetCreate(
            data: {
              subnet: {value: $subnet}
              name: {value: $name}
              status: {value: "active"}
              prefix: {id: $prefix_id}
            }
          ) {
            ok
            object { id }
          }
        }
        "#;

        let name = subnet_display_name(subnet);
        let data = self
            .execute(
                mutation,
                json!({ "subnet": subnet_str, "name": name, "prefix_id": prefix_id }),
            )
            .await?;

        if !data["IpamSubnetCreate"]["ok"].as_bool().unwrap_or(false) {
            return Err(StoreError::Api {
                message: format!("failed to create subnet {}", subnet_str),
            }
            .into());
        }
        log::info!("created subnet {} ({})", subnet_str, name);
        Self::node_id(&data["IpamSubnetCreate"]["object"])
    }

    async fn set_subnet_role(&self, subnet_id: &str, role: SubnetRole) -> Result<()> {
        let mutation = r#"
        mutation UpdateSubnetType($id: String!, $type: String!) {
          IpamSubnetUpdate(data: {id: $id, subnet_type: {value: $type}}) {
            ok
          }
        }
        "#;

        let data = self
            .execute(
                mutation,
                json!({ "id": subnet_id, "type": role.to_string() }),
            )
            .await?;

        if !data["IpamSubnetUpdate"]["ok"].as_bool().unwrap_or(false) {
            return Err(StoreError::Api {
                message: format!("failed to set role on subnet {}", subnet_id),
            }
            .into());
        }
        Ok(())
    }

    async fn set_child_subnets(&self, parent_id: &str, child_ids: &[String]) -> Result<()> {
        let mutation = r#"
        mutation SetChildSubnets($parent_id: String!, $child_ids: [RelatedNodeInput!]!) {
          IpamSubnetUpdate(data: {id: $parent_id, child_subnets: $child_ids}) {
            ok
          }
        }
        "#;

        let children: Vec<Value> = child_ids.iter().map(|id| json!({ "id": id })).collect();
        let data = self
            .execute(
                mutation,
                json!({ "parent_id": parent_id, "child_ids": children }),
            )
            .await?;

        if !data["IpamSubnetUpdate"]["ok"].as_bool().unwrap_or(false) {
            return Err(StoreError::Api {
                message: format!("failed to link children under {}", parent_id),
            }
            .into());
        }
        Ok(())
    }

    async fn clear_parent(&self, subnet_id: &str) -> Result<()> {
        let mutation = r#"
        mutation ClearParent($id: String!) {
          IpamSubnetUpdate(data: {id: $id, parent_subnet: null}) {
            ok
          }
        }
        "#;

        let data = self.execute(mutation, json!({ "id": subnet_id })).await?;
        if !data["IpamSubnetUpdate"]["ok"].as_bool().unwrap_or(false) {
            return Err(StoreError::Api {
                message: format!("failed to clear parent on subnet {}", subnet_id),
            }
            .into());
        }
        Ok(())
    }

    async fn list_ips(&self) -> Result<Vec<IpRecord>> {
        let query = r#"
        {
          IpamIPAddress {
            edges {
              node {
                id
                address { value }
                subnet { node { id } }
              }
            }
          }
        }
        "#;

        let data = self.execute(query, json!({})).await?;
        let mut records = Vec::new();
        for edge in Self::edges(&data, "IpamIPAddress") {
            let node = &edge["node"];
            let value = node["address"]["value"].as_str().unwrap_or_default();
            // Some stores keep addresses in CIDR notation; take the address
            // part either way.
            let address = value.split('/').next().unwrap_or(value);
            let address = match parse_ipv4(address) {
                Ok(address) => address,
                Err(err) => {
                    log::warn!("skipping IP record: {}", err);
                    continue;
                }
            };

            records.push(IpRecord {
                id: Self::node_id(node)?,
                address,
                subnet_id: node["subnet"]["node"]["id"].as_str().map(str::to_string),
            });
        }
        Ok(records)
    }

    async fn create_ip(
        &self,
        address: Ipv4Addr,
        description: &str,
        subnet_id: &str,
    ) -> Result<bool> {
        let lookup = r#"
        query GetIP($address: String!) {
          IpamIPAddress(address__value: $address) {
            edges { node { id } }
          }
        }
        "#;

        let address_str = address.to_string();
        if self
            .find_id(lookup, json!({ "address": address_str }), "IpamIPAddress")
            .await?
            .is_some()
        {
            log::debug!("IP {} already exists", address_str);
            return Ok(false);
        }

        let mutation = r#"
        mutation CreateIPAddress($address: String!, $description: String!, $subnet_id: String!) {
          IpamIPAddressCreate(
            data: {
              address: {value: $address}
              description: {value: $description}
              status: {value: "active"}
              subnet: {id: $subnet_id}
            }
          ) {
            ok
            object { id }
          }
        }
        "#;

        let data = self
            .execute(
                mutation,
                json!({
                    "address": address_str,
                    "description": description,
                    "subnet_id": subnet_id,
                }),
            )
            .await?;

        if !data["IpamIPAddressCreate"]["ok"].as_bool().unwrap_or(false) {
            return Err(StoreError::Api {
                message: format!("failed to create IP {}", address_str),
            }
            .into());
        }
        log::info!("created IP {}", address_str);
        Ok(true)
    }

    async fn set_ip_subnet(&self, ip_id: &str, subnet_id: &str) -> Result<()> {
        let mutation = r#"
        mutation UpdateIPSubnet($ip_id: String!, $subnet_id: String!) {
          IpamIPAddressUpdate(data: {id: $ip_id, subnet: {id: $subnet_id}}) {
            ok
          }
        }
        "#;

        let data = self
            .execute(mutation, json!({ "ip_id": ip_id, "subnet_id": subnet_id }))
            .await?;

        if !data["IpamIPAddressUpdate"]["ok"].as_bool().unwrap_or(false) {
            return Err(StoreError::Api {
                message: format!("failed to relink IP {}", ip_id),
            }
            .into());
        }
        Ok(())
    }
}
