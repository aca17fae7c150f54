//! Status filtering for `vm list`.

use crate::api::types::{ACTIVE_STATUS, Vm};

/// Which VMs a listing shows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum VmFilter {
    /// Only VMs whose status is `Active`.
    #[default]
    ActiveOnly,
    /// Every VM.
    All,
    /// Only VMs with this status, compared ignoring case.
    Status(String),
}

impl VmFilter {
    /// Builds the filter from `--all` and `--status`; a status wins over `--all`.
    #[must_use]
    pub fn from_flags(all: bool, status: Option<&str>) -> Self {
        match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(wanted) => Self::Status(wanted.to_owned()),
            None if all => Self::All,
            None => Self::ActiveOnly,
        }
    }

    /// Whether `vm` passes the filter.
    #[must_use]
    pub fn matches(&self, vm: &Vm) -> bool {
        match self {
            Self::ActiveOnly => vm.status_is(ACTIVE_STATUS),
            Self::All => true,
            Self::Status(status) => vm.status_is(status),
        }
    }

    /// Keeps the VMs that pass, preserving order.
    #[must_use]
    pub fn apply(&self, vms: Vec<Vm>) -> Vec<Vm> {
        vms.into_iter().filter(|vm| self.matches(vm)).collect()
    }

    /// Short description used when a listing comes back empty.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ActiveOnly => String::from("active VMs"),
            Self::All => String::from("VMs"),
            Self::Status(status) => format!("VMs with status {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn vm(id: &str, status: &str) -> Vm {
        Vm {
            id: id.to_owned(),
            status: status.to_owned(),
            ..Vm::default()
        }
    }

    fn fleet() -> Vec<Vm> {
        vec![
            vm("a", "Active"),
            vm("b", "Launching"),
            vm("c", "Terminated"),
            vm("d", "ACTIVE"),
        ]
    }

    fn ids(vms: &[Vm]) -> Vec<&str> {
        vms.iter().map(|vm| vm.id.as_str()).collect()
    }

    #[rstest]
    #[case(false, None, VmFilter::ActiveOnly)]
    #[case(true, None, VmFilter::All)]
    #[case(true, Some("Launching"), VmFilter::Status(String::from("Launching")))]
    #[case(false, Some("  "), VmFilter::ActiveOnly)]
    fn flags_map_to_filters(
        #[case] all: bool,
        #[case] status: Option<&str>,
        #[case] expected: VmFilter,
    ) {
        assert_eq!(VmFilter::from_flags(all, status), expected);
    }

    #[test]
    fn default_shows_only_active() {
        assert_eq!(ids(&VmFilter::default().apply(fleet())), ["a", "d"]);
    }

    #[test]
    fn all_keeps_everything() {
        assert_eq!(ids(&VmFilter::All.apply(fleet())), ["a", "b", "c", "d"]);
    }

    #[test]
    fn status_filter_returns_only_matching_records() {
        let filter = VmFilter::Status(String::from("launching"));
        assert_eq!(ids(&filter.apply(fleet())), ["b"]);
    }
}
