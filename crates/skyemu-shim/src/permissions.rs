// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storage permission results. Logged only; nothing is gated on them.

use tracing::{info, warn};

use skyemu_core::types::{PermissionGrant, STORAGE_PERMISSION_REQUEST_CODE};

/// Interpret `onRequestPermissionsResult`. `None` for other request codes.
pub fn on_permissions_result(request_code: i32, grant_results: &[i32]) -> Option<PermissionGrant> {
    if request_code != STORAGE_PERMISSION_REQUEST_CODE {
        return None;
    }
    let grant = PermissionGrant::from_results(grant_results);
    if grant.all_granted() {
        info!("external storage permissions granted");
    } else {
        warn!(write = grant.write, read = grant.read, "external storage permission denied");
    }
    Some(grant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_request_codes_are_ignored() {
        assert_eq!(on_permissions_result(123, &[0, 0]), None);
    }

    #[test]
    fn storage_results_are_parsed() {
        let grant = on_permissions_result(501, &[0, 0]).unwrap();
        assert!(grant.all_granted());

        let grant = on_permissions_result(501, &[-1, 0]).unwrap();
        assert!(!grant.write && grant.read);

        let grant = on_permissions_result(501, &[]).unwrap();
        assert!(!grant.write && !grant.read);
    }
}
