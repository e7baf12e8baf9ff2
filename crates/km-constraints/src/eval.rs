//! Constraint evaluation logic
//!
//! Pure predicates over a captured [`ConstraintSnapshot`]. No I/O and no
//! live system access happens here, which is what makes mappings testable
//! without a device: build a snapshot, ask whether it permits.

use tracing::{debug, trace};

use crate::constraint::{Constraint, ConstraintMode};
use crate::snapshot::{CallState, ConstraintSnapshot};

/// Evaluates constraints against a snapshot
///
/// Stateless; all methods are associated functions. Unknown snapshot data
/// fails closed: a constraint that needs a field the snapshot does not
/// have evaluates to false.
pub struct ConstraintEvaluator;

impl ConstraintEvaluator {
    /// Decide whether a mapping is permitted to run
    ///
    /// AND mode requires every constraint to hold, OR mode at least one.
    /// An empty constraint list always permits.
    pub fn permits(
        snapshot: &ConstraintSnapshot,
        constraints: &[Constraint],
        mode: ConstraintMode,
    ) -> bool {
        if constraints.is_empty() {
            return true;
        }

        let permitted = match mode {
            ConstraintMode::And => constraints
                .iter()
                .all(|c| Self::is_satisfied(snapshot, c)),
            ConstraintMode::Or => constraints
                .iter()
                .any(|c| Self::is_satisfied(snapshot, c)),
        };

        debug!(?mode, count = constraints.len(), permitted, "Evaluated constraints");
        permitted
    }

    /// Evaluate a single constraint against the snapshot
    pub fn is_satisfied(snapshot: &ConstraintSnapshot, constraint: &Constraint) -> bool {
        let satisfied = match constraint {
            Constraint::AppInForeground { package } => snapshot
                .foreground_package
                .as_deref()
                .is_some_and(|fg| fg == package),

            Constraint::AppNotInForeground { package } => snapshot
                .foreground_package
                .as_deref()
                .is_some_and(|fg| fg != package),

            Constraint::ScreenOn => snapshot.screen_on == Some(true),
            Constraint::ScreenOff => snapshot.screen_on == Some(false),

            Constraint::InPhoneCall => snapshot.call_state == Some(CallState::InCall),
            Constraint::NotInPhoneCall => snapshot.call_state == Some(CallState::Idle),
            Constraint::PhoneRinging => snapshot.call_state == Some(CallState::Ringing),

            Constraint::BtDeviceConnected { address } => snapshot
                .connected_bt_devices
                .as_deref()
                .is_some_and(|devices| devices.iter().any(|d| d == address)),

            Constraint::BtDeviceDisconnected { address } => snapshot
                .connected_bt_devices
                .as_deref()
                .is_some_and(|devices| !devices.iter().any(|d| d == address)),

            Constraint::WifiOn => snapshot.wifi.as_ref().is_some_and(|w| w.enabled),
            Constraint::WifiOff => snapshot.wifi.as_ref().is_some_and(|w| !w.enabled),

            Constraint::WifiConnected { ssid } => {
                snapshot.wifi.as_ref().is_some_and(|w| {
                    match (&w.connected_ssid, ssid) {
                        (Some(connected), Some(wanted)) => connected == wanted,
                        (Some(_), None) => true,
                        (None, _) => false,
                    }
                })
            }

            Constraint::ImeChosen { ime_id } => snapshot
                .chosen_ime_id
                .as_deref()
                .is_some_and(|chosen| chosen == ime_id),

            Constraint::DeviceLocked => snapshot.device_locked == Some(true),
            Constraint::DeviceUnlocked => snapshot.device_locked == Some(false),

            Constraint::Charging => snapshot.charging == Some(true),
            Constraint::Discharging => snapshot.charging == Some(false),
        };

        trace!(?constraint, satisfied, "Constraint check");
        satisfied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ConstraintSnapshot {
        ConstraintSnapshot::unknown()
            .with_screen_on(true)
            .with_foreground_package("com.example.maps")
            .with_call_state(CallState::Idle)
            .with_bt_devices(vec!["AA:BB:CC:DD:EE:FF".to_string()])
            .with_charging(false)
    }

    #[test]
    fn test_empty_constraints_always_permit() {
        let snapshot = ConstraintSnapshot::unknown();
        assert!(ConstraintEvaluator::permits(&snapshot, &[], ConstraintMode::And));
        assert!(ConstraintEvaluator::permits(&snapshot, &[], ConstraintMode::Or));
    }

    #[test]
    fn test_and_mode_requires_all() {
        let constraints = [
            Constraint::ScreenOn,
            Constraint::AppInForeground {
                package: "com.example.maps".to_string(),
            },
        ];
        assert!(ConstraintEvaluator::permits(
            &snapshot(),
            &constraints,
            ConstraintMode::And
        ));

        let constraints = [Constraint::ScreenOn, Constraint::Charging];
        assert!(!ConstraintEvaluator::permits(
            &snapshot(),
            &constraints,
            ConstraintMode::And
        ));
    }

    #[test]
    fn test_or_mode_requires_any() {
        let constraints = [Constraint::Charging, Constraint::ScreenOn];
        assert!(ConstraintEvaluator::permits(
            &snapshot(),
            &constraints,
            ConstraintMode::Or
        ));

        let constraints = [Constraint::Charging, Constraint::ScreenOff];
        assert!(!ConstraintEvaluator::permits(
            &snapshot(),
            &constraints,
            ConstraintMode::Or
        ));
    }

    #[test]
    fn test_unknown_data_fails_closed() {
        let snapshot = ConstraintSnapshot::unknown();

        assert!(!ConstraintEvaluator::is_satisfied(&snapshot, &Constraint::ScreenOn));
        assert!(!ConstraintEvaluator::is_satisfied(&snapshot, &Constraint::ScreenOff));
        assert!(!ConstraintEvaluator::is_satisfied(&snapshot, &Constraint::InPhoneCall));
        assert!(!ConstraintEvaluator::is_satisfied(
            &snapshot,
            &Constraint::AppNotInForeground {
                package: "com.example".to_string()
            }
        ));
        assert!(!ConstraintEvaluator::is_satisfied(
            &snapshot,
            &Constraint::BtDeviceDisconnected {
                address: "AA:BB:CC:DD:EE:FF".to_string()
            }
        ));
    }

    #[test]
    fn test_app_foreground_constraints() {
        let snapshot = snapshot();

        assert!(ConstraintEvaluator::is_satisfied(
            &snapshot,
            &Constraint::AppInForeground {
                package: "com.example.maps".to_string()
            }
        ));
        assert!(!ConstraintEvaluator::is_satisfied(
            &snapshot,
            &Constraint::AppInForeground {
                package: "com.example.other".to_string()
            }
        ));
        assert!(ConstraintEvaluator::is_satisfied(
            &snapshot,
            &Constraint::AppNotInForeground {
                package: "com.example.other".to_string()
            }
        ));
    }

    #[test]
    fn test_call_state_constraints() {
        let ringing = ConstraintSnapshot::unknown().with_call_state(CallState::Ringing);

        assert!(ConstraintEvaluator::is_satisfied(&ringing, &Constraint::PhoneRinging));
        assert!(!ConstraintEvaluator::is_satisfied(&ringing, &Constraint::InPhoneCall));
        // Ringing is not idle either
        assert!(!ConstraintEvaluator::is_satisfied(&ringing, &Constraint::NotInPhoneCall));
    }

    #[test]
    fn test_bt_device_constraints() {
        let snapshot = snapshot();

        assert!(ConstraintEvaluator::is_satisfied(
            &snapshot,
            &Constraint::BtDeviceConnected {
                address: "AA:BB:CC:DD:EE:FF".to_string()
            }
        ));
        assert!(ConstraintEvaluator::is_satisfied(
            &snapshot,
            &Constraint::BtDeviceDisconnected {
                address: "11:22:33:44:55:66".to_string()
            }
        ));
    }

    #[test]
    fn test_wifi_constraints() {
        let connected = ConstraintSnapshot::unknown().with_wifi(true, Some("home".to_string()));

        assert!(ConstraintEvaluator::is_satisfied(&connected, &Constraint::WifiOn));
        assert!(ConstraintEvaluator::is_satisfied(
            &connected,
            &Constraint::WifiConnected { ssid: None }
        ));
        assert!(ConstraintEvaluator::is_satisfied(
            &connected,
            &Constraint::WifiConnected {
                ssid: Some("home".to_string())
            }
        ));
        assert!(!ConstraintEvaluator::is_satisfied(
            &connected,
            &Constraint::WifiConnected {
                ssid: Some("office".to_string())
            }
        ));

        let enabled_not_connected = ConstraintSnapshot::unknown().with_wifi(true, None);
        assert!(!ConstraintEvaluator::is_satisfied(
            &enabled_not_connected,
            &Constraint::WifiConnected { ssid: None }
        ));
    }
}
