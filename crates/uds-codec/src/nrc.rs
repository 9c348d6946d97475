//! Negative Response Codes (ISO 14229-1 Annex A.1)

/// Known negative response codes and their names
pub const NEGATIVE_RESPONSE_CODES: &[(u8, &str)] = &[
    // General
    (0x10, "generalReject"),
    (0x11, "serviceNotSupported"),
    (0x12, "subFunctionNotSupported"),
    (0x13, "incorrectMessageLengthOrInvalidFormat"),
    (0x14, "responseTooLong"),
    // Conditions
    (0x21, "busyRepeatRequest"),
    (0x22, "conditionsNotCorrect"),
    (0x24, "requestSequenceError"),
    (0x25, "noResponseFromSubnetComponent"),
    (0x26, "failurePreventsExecutionOfRequestedAction"),
    // Request
    (0x31, "requestOutOfRange"),
    (0x33, "securityAccessDenied"),
    (0x34, "authenticationRequired"),
    (0x35, "invalidKey"),
    (0x36, "exceedNumberOfAttempts"),
    (0x37, "requiredTimeDelayNotExpired"),
    // Upload / download
    (0x70, "uploadDownloadNotAccepted"),
    (0x71, "transferDataSuspended"),
    (0x72, "generalProgrammingFailure"),
    (0x73, "wrongBlockSequenceCounter"),
    (0x78, "requestCorrectlyReceived-ResponsePending"),
    (0x7E, "subFunctionNotSupportedInActiveSession"),
    (0x7F, "serviceNotSupportedInActiveSession"),
    // Vehicle conditions
    (0x81, "rpmTooHigh"),
    (0x82, "rpmTooLow"),
    (0x83, "engineIsRunning"),
    (0x84, "engineIsNotRunning"),
    (0x85, "engineRunTimeTooLow"),
    (0x86, "temperatureTooHigh"),
    (0x87, "temperatureTooLow"),
    (0x88, "vehicleSpeedTooHigh"),
    (0x89, "vehicleSpeedTooLow"),
    (0x8A, "throttle/PedalTooHigh"),
    (0x8B, "throttle/PedalTooLow"),
    (0x8C, "transmissionRangeNotInNeutral"),
    (0x8D, "transmissionRangeNotInGear"),
    (0x8F, "brakeSwitch(es)NotClosed"),
    (0x90, "shifterLeverNotInPark"),
    (0x91, "torqueConverterClutchLocked"),
    (0x92, "voltageTooHigh"),
    (0x93, "voltageTooLow"),
];

/// NRC 0x78: the server needs more time before it sends the final response
pub const RESPONSE_PENDING: u8 = 0x78;

/// Name of a negative response code
pub fn nrc_name(code: u8) -> Option<&'static str> {
    NEGATIVE_RESPONSE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
