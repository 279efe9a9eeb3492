pub mod farmer;
pub mod fruit;
pub mod infrastructure;
pub mod plantation;
pub mod region;
pub mod user;

pub use farmer::{Farmer, FarmerInput};
pub use fruit::{Fruit, FruitVariety, Rootstock, RootstockInput};
pub use infrastructure::{
    InvestType, Investment, InvestmentFields, InvestmentInput, Reservoir, ReservoirFields, ReservoirInput,
    ReservoirType, Subsidy, SubsidyInput, Trellis, TrellisFields, TrellisInput, TrellisType,
};
pub use plantation::{
    Coordinate, CoordinateInput, FruitArea, FruitAreaInput, LandType, Plantation, PlantationImage,
    PlantationInput, PlantationPatch, PlantationSummary,
};
pub use region::{District, DistrictInput, Region};
pub use user::User;
