//! POD Calc prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    fees::EtsyFees,
    niche::{
        Brand, NicheInputError, TrendDirection,
        brands::{AssignmentMethod, BrandAssignment, BrandKeywords},
        v1::{NicheQueryV1, NicheRuleV1, NicheV1Rules, NicheVerdictV1, Recommendation},
        v2::{Decision, NicheQueryV2, NicheRuleV2, NicheV2Rules, NicheVerdictV2},
    },
    pricing::{
        PricingError,
        v1::{PricingInputError, PricingRequestV1, PricingRuleV1, PricingV1Outcome},
        v2::{PricingRequest, PricingRuleV2, PricingV2Result, PricingV2Rules},
    },
    products::{ProductCatalog, ProductSpec, ProductType},
    report::{ReportError, Tabulate},
    rule::Rule,
    rulebook::{RuleBook, RuleBookError},
    seo::{ListingDraft, SeoError, SeoReport, SeoRules, SeoValidator},
};
