// Well-known column names shared by the datasets.

pub const SUBURB: &str = "Suburb";

// Price history (master)
pub const AVG_PRICE_ALL_TIME: &str = "Avg_Price_All_Time";
pub const MEDIAN_PRICE_ALL_TIME: &str = "Median_Price_All_Time";
pub const MIN_PRICE_EVER: &str = "Min_Price_Ever";
pub const MAX_PRICE_EVER: &str = "Max_Price_Ever";
pub const PRICE_VOLATILITY: &str = "Price_Volatility";
pub const QUARTER_COUNT: &str = "Quarter_Count";
pub const CURRENT_PRICE_2025: &str = "Current_Price_2025";
pub const FIRST_PRICE_2019: &str = "First_Price_2019";
pub const PRICE_GROWTH_AMOUNT: &str = "Price_Growth_Amount";
pub const PRICE_GROWTH_PERCENT: &str = "Price_Growth_Percent";

// Crime (master)
pub const TOTAL_CRIME_COUNT: &str = "Total_Crime_Count";
pub const CRIME_AGAINST_PROPERTY: &str = "Crime_OFFENCES_AGAINST_PROPERTY";
pub const CRIME_AGAINST_PERSON: &str = "Crime_OFFENCES_AGAINST_THE_PERSON";
pub const PROPERTY_CRIME_COUNT: &str = "Property_Crime_Count";
pub const PERSON_CRIME_COUNT: &str = "Person_Crime_Count";

// Census (master)
pub const POPULATION_TOTAL: &str = "G01_Population_Total";
pub const MEDIAN_AGE: &str = "G02_Median_age_persons";
pub const MEDIAN_MORTGAGE_MONTHLY: &str = "G02_Median_mortgage_repay_monthly";
pub const MEDIAN_PERSONAL_INCOME_WEEKLY: &str = "G02_Median_tot_prsnl_inc_weekly";
pub const MEDIAN_RENT_WEEKLY: &str = "G02_Median_rent_weekly";
pub const MEDIAN_FAMILY_INCOME_WEEKLY: &str = "G02_Median_tot_fam_inc_weekly";
pub const PERSONS_PER_BEDROOM: &str = "G02_Average_num_psns_per_bedroom";
pub const MEDIAN_HOUSEHOLD_INCOME_WEEKLY: &str = "G02_Median_tot_hhd_inc_weekly";
pub const AVERAGE_HOUSEHOLD_SIZE: &str = "G02_Average_household_size";

// Predictions / risk
pub const FORECAST_PRICE_2026: &str = "Forecast_Price_2026";
pub const EXPECTED_GROWTH_2026: &str = "Expected_Growth_2026";
pub const TOTAL_RISK_SCORE: &str = "Total_Risk_Score";
pub const TOTAL_RISK_CATEGORY: &str = "Total_Risk_Category";

// Derived
pub const CRIME_RATE_PER_1000: &str = "Crime_Rate_Per_1000";

// Time series
pub const MEDIAN_PRICE: &str = "Median_Price";
pub const PERIOD: &str = "Period";
pub const QUARTER: &str = "Quarter";
pub const YEAR: &str = "Year";

/// Columns requested from the master dataset.
pub const MASTER_CORE_COLUMNS: &[&str] = &[
    SUBURB,
    AVG_PRICE_ALL_TIME,
    MEDIAN_PRICE_ALL_TIME,
    MIN_PRICE_EVER,
    MAX_PRICE_EVER,
    PRICE_VOLATILITY,
    QUARTER_COUNT,
    CURRENT_PRICE_2025,
    FIRST_PRICE_2019,
    PRICE_GROWTH_AMOUNT,
    PRICE_GROWTH_PERCENT,
    TOTAL_CRIME_COUNT,
    CRIME_AGAINST_PROPERTY,
    CRIME_AGAINST_PERSON,
    PROPERTY_CRIME_COUNT,
    PERSON_CRIME_COUNT,
    POPULATION_TOTAL,
    MEDIAN_AGE,
    MEDIAN_MORTGAGE_MONTHLY,
    MEDIAN_PERSONAL_INCOME_WEEKLY,
    MEDIAN_RENT_WEEKLY,
    MEDIAN_FAMILY_INCOME_WEEKLY,
    PERSONS_PER_BEDROOM,
    MEDIAN_HOUSEHOLD_INCOME_WEEKLY,
    AVERAGE_HOUSEHOLD_SIZE,
];

/// Columns requested from the rental analysis (the file is large).
pub const RENTAL_COLUMNS: &[&str] = &[
    SUBURB,
    "Census_Rent_2021",
    "Fair_Rent_2025",
    "Fair_House_Rent_2025",
    "Fair_Unit_Rent_2025",
    "Estimated_Actual_Rent_2025",
    "Actual_House_Rent_2025",
    "Actual_Unit_Rent_2025",
    "Greediness_Percent",
    "Fair_House_Yield",
    "Actual_House_Yield",
    "Actual_Unit_Yield",
    "Affordability_Category",
    "Affordability_Ratio",
    "Individual_Affordability",
    "Household_Affordability",
];

/// Columns requested from the cultural demographics. Population and price
/// are also in master and lose the collision.
pub const CULTURAL_COLUMNS: &[&str] = &[
    SUBURB,
    POPULATION_TOTAL,
    CURRENT_PRICE_2025,
    "Indian_Population",
    "Indian_Percent",
    "Chinese_Population",
    "Chinese_Percent",
    "Vietnamese_Population",
    "Vietnamese_Percent",
    "Italian_Population",
    "Italian_Percent",
    "Greek_Population",
    "Greek_Percent",
    "Cultural_Diversity_Index",
];

/// Columns requested from the quarterly price series.
pub const TIMESERIES_COLUMNS: &[&str] = &[SUBURB, MEDIAN_PRICE, PERIOD, QUARTER, YEAR];
