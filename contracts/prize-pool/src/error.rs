use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized    = 1,
    NotInitialized        = 2,
    NotAuthorized         = 3,
    ContractPaused        = 4,
    AlreadyPaused         = 5,
    NotPaused             = 6,
    InvalidFeeConfig      = 7,
    InvalidAddress        = 8,
    InvalidName           = 9,
    GameAlreadyExists     = 10,
    InvalidRoundTimes     = 11,
    AssetMismatch         = 12,
    YieldSourceNotSet     = 13,
    GameNotFound          = 14,
    RoundNotFound         = 15,
    DepositNotFound       = 16,
    WrongPhase            = 17,
    NothingToDeploy       = 18,
    AlreadyWithdrawn      = 19,
    AlreadySettled        = 20,
    AlreadyClaimed        = 21,
    Reentrant             = 22,
    InvalidAmount         = 23,
    FundsNotDeployed      = 24,
    NotWithdrawn          = 25,
    NotSettled            = 26,
    NoPrincipal           = 27,
    NotParticipant        = 28,
    AwardExceedsPrizePool = 29,
    Overflow              = 30,
    TransferFailed        = 31,
    StrategyCallFailed    = 32,
}

/// Coarse failure classes callers can branch on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Configuration,
    Authorization,
    PhaseViolation,
    NotFound,
    AlreadyDone,
    InsufficientState,
    ExternalCallFailure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyInitialized
            | Error::NotInitialized
            | Error::ContractPaused
            | Error::AlreadyPaused
            | Error::NotPaused
            | Error::InvalidFeeConfig
            | Error::InvalidAddress
            | Error::InvalidName
            | Error::GameAlreadyExists
            | Error::InvalidRoundTimes
            | Error::AssetMismatch
            | Error::YieldSourceNotSet => ErrorKind::Configuration,
            Error::NotAuthorized => ErrorKind::Authorization,
            Error::WrongPhase => ErrorKind::PhaseViolation,
            Error::GameNotFound | Error::RoundNotFound | Error::DepositNotFound => {
                ErrorKind::NotFound
            }
            Error::NothingToDeploy
            | Error::AlreadyWithdrawn
            | Error::AlreadySettled
            | Error::AlreadyClaimed
            | Error::Reentrant => ErrorKind::AlreadyDone,
            Error::InvalidAmount
            | Error::FundsNotDeployed
            | Error::NotWithdrawn
            | Error::NotSettled
            | Error::NoPrincipal
            | Error::NotParticipant
            | Error::AwardExceedsPrizePool
            | Error::Overflow => ErrorKind::InsufficientState,
            Error::TransferFailed | Error::StrategyCallFailed => ErrorKind::ExternalCallFailure,
        }
    }
}
