//! Backend detection and auto-selection.

use super::{Backend, DeviceClass};

/// Information about a compute backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Backend type.
    pub backend: Backend,
    /// Human-readable name.
    pub name: &'static str,
    /// Device class the backend binds to.
    pub class: DeviceClass,
    /// Whether backend is available.
    pub available: bool,
    /// Priority for auto-selection (higher = preferred).
    pub priority: u32,
    /// Description.
    pub description: String,
}

/// Detect all backends, best first.
pub fn detect_backends() -> Vec<BackendInfo> {
    let mut backends = vec![
        BackendInfo {
            backend: Backend::Cpu,
            name: "CPU",
            class: DeviceClass::Fallback,
            available: true,
            priority: 10,
            description: "CPU with rayon parallelization".to_string(),
        },
    ];

    #[cfg(feature = "wgpu")]
    {
        let adapters = super::WgpuDevice::accelerated_adapters();
        let available = !adapters.is_empty();
        let description = match adapters.first() {
            Some(info) => format!("GPU via wgpu: {} ({:?})", info.name, info.backend),
            None => "GPU via wgpu (no accelerated adapter found)".to_string(),
        };
        backends.push(BackendInfo {
            backend: Backend::Wgpu,
            name: "wgpu",
            class: DeviceClass::Accelerated,
            available,
            priority: if available { 100 } else { 0 },
            description,
        });
    }

    backends.sort_by(|a, b| b.priority.cmp(&a.priority));
    backends
}

/// Pick from a detected list: an available accelerated backend if any, else CPU.
pub fn choose_backend(backends: &[BackendInfo]) -> Backend {
    backends
        .iter()
        .filter(|b| b.available && b.class == DeviceClass::Accelerated)
        .max_by_key(|b| b.priority)
        .map(|b| b.backend)
        .unwrap_or(Backend::Cpu)
}

/// Select the best available backend.
pub fn select_best_backend() -> Backend {
    choose_backend(&detect_backends())
}

/// Get description of available backends.
pub fn describe_backends() -> String {
    let backends = detect_backends();
    let mut desc = String::new();

    for info in backends {
        let status = if info.available { "+" } else { "-" };
        desc.push_str(&format!("[{}] {}: {}\n", status, info.name, info.description));
    }

    desc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(backend: Backend, class: DeviceClass, available: bool, priority: u32) -> BackendInfo {
        BackendInfo {
            backend,
            name: backend.name(),
            class,
            available,
            priority,
            description: String::new(),
        }
    }

    #[test]
    fn test_choose_accelerated_when_present() {
        let list = [
            info(Backend::Cpu, DeviceClass::Fallback, true, 10),
            info(Backend::Wgpu, DeviceClass::Accelerated, true, 100),
        ];
        assert_eq!(choose_backend(&list), Backend::Wgpu);
    }

    #[test]
    fn test_choose_fallback_when_empty() {
        let list = [
            info(Backend::Wgpu, DeviceClass::Accelerated, false, 0),
            info(Backend::Cpu, DeviceClass::Fallback, true, 10),
        ];
        assert_eq!(choose_backend(&list), Backend::Cpu);
        assert_eq!(choose_backend(&[]), Backend::Cpu);
    }

    #[test]
    fn test_cpu_always_listed() {
        let list = detect_backends();
        assert!(list.iter().any(|b| b.backend == Backend::Cpu && b.available));
    }
}
