// ============================================================
// Layer 2 — Compute Device Selection
// ============================================================
// Turns the configured backend + device id into a device that
// actually exists on this machine:
//
//   wgpu     → DiscreteGpu(id) → default adapter → ndarray CPU
//   ndarray  → CPU
//
// cubecl panics when no adapter matches, so each wgpu candidate is
// probed with a tiny allocation inside catch_unwind first.

use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Wgpu},
    prelude::*,
};
use std::panic;

use crate::application::train_use_case::BackendKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ComputeDevice {
    Wgpu(WgpuDevice),
    NdArray(NdArrayDevice),
}

/// Pick the first usable device for `backend`. `usable` decides whether
/// a wgpu device can be initialised.
pub fn resolve_device<F>(backend: BackendKind, device_id: usize, usable: F) -> ComputeDevice
where
    F: Fn(&WgpuDevice) -> bool,
{
    match backend {
        BackendKind::NdArray => ComputeDevice::NdArray(NdArrayDevice::Cpu),
        BackendKind::Wgpu => {
            let candidates = [WgpuDevice::DiscreteGpu(device_id), WgpuDevice::default()];
            for (i, device) in candidates.into_iter().enumerate() {
                if usable(&device) {
                    if i > 0 {
                        tracing::warn!(
                            "No discrete GPU {device_id}; falling back to default adapter {:?}",
                            device
                        );
                    }
                    return ComputeDevice::Wgpu(device);
                }
            }
            tracing::warn!("No usable wgpu adapter; falling back to the ndarray CPU backend");
            ComputeDevice::NdArray(NdArrayDevice::Cpu)
        }
    }
}

/// Try to allocate and read back one element on `device`.
pub fn wgpu_usable(device: &WgpuDevice) -> bool {
    let device = device.clone();
    panic::catch_unwind(move || {
        let _ = Tensor::<Wgpu, 1>::zeros([1], &device).into_data();
    })
    .is_ok()
}
