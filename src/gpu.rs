//! GPU vendor detection and PRIME classification
//!
//! Vendors are read from the PCI parents of the `drm` card devices through
//! udev. On hybrid systems the discrete card gets the offload variables and
//! the other one is recorded as integrated.

use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
}

impl GpuVendor {
    pub fn from_pci_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "0x10de" => Some(GpuVendor::Nvidia),
            "0x1002" => Some(GpuVendor::Amd),
            "0x8086" => Some(GpuVendor::Intel),
            _ => None,
        }
    }

    /// Substring identifying this vendor's Vulkan ICD manifest
    fn icd_keyword(&self) -> &'static str {
        match self {
            GpuVendor::Nvidia => "nvidia",
            GpuVendor::Amd => "radeon",
            GpuVendor::Intel => "intel",
        }
    }

    fn offload_env(&self) -> Vec<(String, String)> {
        let pairs: &[(&str, &str)] = match self {
            GpuVendor::Nvidia => &[
                ("__NV_PRIME_RENDER_OFFLOAD", "1"),
                ("__GLX_VENDOR_LIBRARY_NAME", "nvidia"),
                ("__VK_LAYER_NV_optimus", "NVIDIA_only"),
            ],
            GpuVendor::Amd | GpuVendor::Intel => &[("DRI_PRIME", "1")],
        };
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GpuProfile {
    pub vendor: GpuVendor,
    pub env: Vec<(String, String)>,
    /// Colon-joined ICD manifest paths
    pub icd: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GpuInfo {
    /// Every vendor found, in detection order
    pub vendors: Vec<GpuProfile>,
    pub discrete: Option<GpuProfile>,
    pub integrated: Option<GpuProfile>,
}

const ICD_DIRS: [&str; 4] = [
    "/usr/share/vulkan/icd.d",
    "/etc/vulkan/icd.d",
    "/usr/local/share/vulkan/icd.d",
    "/run/opengl-driver/share/vulkan/icd.d",
];

/// ICD manifests under `dirs` that belong to `vendor`, colon-joined
pub fn find_icd(vendor: GpuVendor, dirs: &[&Path]) -> String {
    let mut found = Vec::new();
    for dir in dirs {
        let pattern = dir.join(format!("*{}*.json", vendor.icd_keyword()));
        let Ok(entries) = glob::glob(&pattern.to_string_lossy()) else {
            continue;
        };
        for entry in entries.flatten() {
            found.push(entry.to_string_lossy().into_owned());
        }
    }
    found.sort();
    found.join(":")
}

/// Build the PRIME classification from the detected vendors
pub fn classify(vendors: &[GpuVendor], icd_for: impl Fn(GpuVendor) -> String) -> GpuInfo {
    let mut unique: Vec<GpuVendor> = Vec::new();
    for vendor in vendors {
        if !unique.contains(vendor) {
            unique.push(*vendor);
        }
    }

    let profile = |vendor: GpuVendor| GpuProfile {
        vendor,
        env: vendor.offload_env(),
        icd: icd_for(vendor),
    };

    let mut info = GpuInfo {
        vendors: unique.iter().map(|v| profile(*v)).collect(),
        ..Default::default()
    };

    if unique.len() >= 2 {
        let has = |v: GpuVendor| unique.contains(&v);
        let (discrete, integrated) = if has(GpuVendor::Nvidia) {
            let integrated = if has(GpuVendor::Amd) {
                GpuVendor::Amd
            } else {
                GpuVendor::Intel
            };
            (GpuVendor::Nvidia, integrated)
        } else {
            (GpuVendor::Amd, GpuVendor::Intel)
        };
        info.discrete = Some(profile(discrete));
        info.integrated = Some(profile(integrated));
    }
    info
}

/// Vendors of every DRM card, read through udev
pub fn detect_vendors() -> std::io::Result<Vec<GpuVendor>> {
    let mut enumerator = udev::Enumerator::new()?;
    enumerator.match_subsystem("drm")?;

    let mut vendors = Vec::new();
    for device in enumerator.scan_devices()? {
        let sysname = device.sysname().to_string_lossy();
        // card0-DP-1 style connectors share the parent of their card
        if !sysname.starts_with("card") || sysname.contains('-') {
            continue;
        }
        let Some(parent) = device.parent() else {
            continue;
        };
        let Some(id) = parent.attribute_value("vendor") else {
            continue;
        };
        if let Some(vendor) = GpuVendor::from_pci_id(&id.to_string_lossy()) {
            vendors.push(vendor);
        }
    }
    Ok(vendors)
}

/// Detect the host GPUs; empty info when udev is unavailable
pub fn detect() -> GpuInfo {
    let vendors = match detect_vendors() {
        Ok(vendors) => vendors,
        Err(e) => {
            tracing::warn!("gpu - udev enumeration failed: {}", e);
            Vec::new()
        }
    };
    let dirs: Vec<&Path> = ICD_DIRS.iter().map(Path::new).collect();
    let info = classify(&vendors, |vendor| find_icd(vendor, &dirs));
    tracing::debug!(
        "gpu - vendors: {:?}",
        info.vendors.iter().map(|p| p.vendor).collect::<Vec<_>>()
    );
    info
}

/// Env pairs of a profile as a map, for callers that merge them
pub fn env_map(profile: &GpuProfile) -> BTreeMap<String, String> {
    profile.env.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_icd(vendor: GpuVendor) -> String {
        format!("/icd/{}.json", vendor.icd_keyword())
    }

    #[test]
    fn pci_ids_map_to_vendors() {
        assert_eq!(GpuVendor::from_pci_id("0x10de\n"), Some(GpuVendor::Nvidia));
        assert_eq!(GpuVendor::from_pci_id("0x1002"), Some(GpuVendor::Amd));
        assert_eq!(GpuVendor::from_pci_id("0x8086"), Some(GpuVendor::Intel));
        assert_eq!(GpuVendor::from_pci_id("0x1af4"), None);
    }

    #[test]
    fn nvidia_hybrid_is_discrete() {
        let info = classify(&[GpuVendor::Intel, GpuVendor::Nvidia], fake_icd);
        let discrete = info.discrete.unwrap();
        assert_eq!(discrete.vendor, GpuVendor::Nvidia);
        assert_eq!(env_map(&discrete)["__NV_PRIME_RENDER_OFFLOAD"], "1");
        assert_eq!(info.integrated.unwrap().vendor, GpuVendor::Intel);
    }

    #[test]
    fn amd_intel_hybrid() {
        let info = classify(&[GpuVendor::Amd, GpuVendor::Intel], fake_icd);
        assert_eq!(info.discrete.unwrap().icd, "/icd/radeon.json");
        assert_eq!(info.integrated.unwrap().vendor, GpuVendor::Intel);
    }

    #[test]
    fn single_gpu_has_no_prime() {
        let info = classify(&[GpuVendor::Amd, GpuVendor::Amd], fake_icd);
        assert_eq!(info.vendors.len(), 1);
        assert!(info.discrete.is_none());
        assert!(info.integrated.is_none());
    }

    #[test]
    fn icd_files_are_globbed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("radeon_icd.x86_64.json"), "{}").unwrap();
        fs::write(dir.path().join("radeon_icd.i686.json"), "{}").unwrap();
        fs::write(dir.path().join("nvidia_icd.json"), "{}").unwrap();

        let icd = find_icd(GpuVendor::Amd, &[dir.path()]);
        let parts: Vec<&str> = icd.split(':').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.contains("radeon")));
        assert_eq!(find_icd(GpuVendor::Intel, &[dir.path()]), "");
    }
}
